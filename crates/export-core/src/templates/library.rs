//! Publishable component package
//!
//! Each component lives in its own folder with an `index` module that
//! re-exports the default export under the normalized identifier; the
//! top-level barrel re-exports every folder.

use super::common::{self, js_string, REACT_VERSION};
use super::{ComponentEntry, GeneratedProject, GeneratedTree, Manifest, Named, RunScript};
use crate::error::GenerateError;
use crate::options::{Bundler, LibraryOptions};
use serde_json::{json, Map, Value};

pub const STORYBOOK_URL: &str = "http://localhost:6006";

/// Stem of the per-folder re-export module
const FOLDER_MODULE: &str = "index";

const PEER_REACT: &str = "^17.0.0 || ^18.0.0";
const STORYBOOK_VERSION: &str = "^7.0.24";

const ROLLUP_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("@rollup/plugin-babel", "^6.0.3"),
    ("@rollup/plugin-commonjs", "^25.0.2"),
    ("@rollup/plugin-node-resolve", "^15.1.0"),
    ("rollup", "^3.26.0"),
    ("rollup-plugin-peer-deps-external", "^2.2.4"),
    ("rollup-plugin-terser", "^7.0.2"),
];

const WEBPACK_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("babel-loader", "^9.1.2"),
    ("webpack", "^5.88.1"),
    ("webpack-cli", "^5.1.4"),
];

const BABEL_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("@babel/core", "^7.22.5"),
    ("@babel/preset-env", "^7.22.5"),
    ("@babel/preset-react", "^7.22.5"),
];

const STORYBOOK_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("@storybook/addon-essentials", STORYBOOK_VERSION),
    ("@storybook/addon-links", STORYBOOK_VERSION),
    ("@storybook/blocks", STORYBOOK_VERSION),
    ("@storybook/react", STORYBOOK_VERSION),
    ("@storybook/react-webpack5", STORYBOOK_VERSION),
    ("storybook", STORYBOOK_VERSION),
];

pub fn generate(
    named: &[Named<'_>],
    options: &LibraryOptions,
) -> Result<GeneratedProject, GenerateError> {
    let ts = options.use_typescript;
    let (ext, module_ext) = if ts { ("tsx", "ts") } else { ("jsx", "js") };

    let base = [("react", REACT_VERSION), ("react-dom", REACT_VERSION)];
    let mut manifest = Manifest::new(&base, named);
    manifest.dev(&[("@types/react", "^18.2.15"), ("@types/react-dom", "^18.2.7")]);
    manifest.dev(BABEL_DEV_DEPENDENCIES);
    match options.bundler {
        Bundler::Rollup => {
            manifest.dev(ROLLUP_DEV_DEPENDENCIES);
            if ts {
                manifest.dev(&[("@rollup/plugin-typescript", "^11.1.2")]);
            }
        }
        Bundler::Webpack => {
            manifest.dev(WEBPACK_DEV_DEPENDENCIES);
            if ts {
                manifest.dev(&[("ts-loader", "^9.4.4")]);
            }
        }
    }
    if ts {
        manifest.dev(&[("@babel/preset-typescript", "^7.22.5"), ("typescript", "^5.1.6")]);
    }
    if options.include_storybook {
        manifest.dev(STORYBOOK_DEV_DEPENDENCIES);
    }

    let mut tree = GeneratedTree::new();
    tree.insert_text("package.json", package_json(options, &manifest))?;
    match options.bundler {
        Bundler::Rollup => tree.insert_text("rollup.config.js", rollup_config(ts))?,
        Bundler::Webpack => tree.insert_text("webpack.config.js", webpack_config(options))?,
    }
    if ts {
        tree.insert_text("tsconfig.json", tsconfig())?;
    }

    let mut components = Vec::with_capacity(named.len());
    for n in named {
        let id = &n.identifier;
        // `./index` from inside the folder would import the module itself
        if id.eq_ignore_ascii_case(FOLDER_MODULE) {
            return Err(GenerateError::InvalidName {
                name: n.component.name.clone(),
            });
        }
        let path = format!("src/components/{id}/{id}.{ext}");
        tree.insert_text(path.clone(), n.component.content.clone())?;
        tree.insert_text(
            format!("src/components/{id}/{FOLDER_MODULE}.{module_ext}"),
            format!("export {{ default as {id} }} from './{id}';\n"),
        )?;
        components.push(ComponentEntry {
            name: n.component.name.clone(),
            identifier: id.clone(),
            path,
        });
    }

    let barrel: String = named
        .iter()
        .map(|n| format!("export * from './components/{}';\n", n.identifier))
        .collect();
    tree.insert_text(format!("src/index.{module_ext}"), barrel)?;

    if options.include_storybook {
        for n in named {
            tree.insert_text(
                format!("stories/{}.stories.{}", n.identifier, ext),
                story(n),
            )?;
        }
        tree.insert_text(".storybook/main.js", storybook_main(ext))?;
        tree.insert_text(".storybook/preview.js", STORYBOOK_PREVIEW)?;
    }

    tree.insert_text("README.md", readme(named, options))?;
    common::insert_gitignore(&mut tree)?;

    let run_script = options.include_storybook.then(|| RunScript {
        args: vec!["run", "storybook"],
        url: STORYBOOK_URL,
    });

    Ok(GeneratedProject {
        tree,
        manifest,
        components,
        run_script,
    })
}

fn package_json(options: &LibraryOptions, manifest: &Manifest) -> String {
    let mut scripts = Map::new();
    let build = match options.bundler {
        Bundler::Rollup => "rollup -c",
        Bundler::Webpack => "webpack --mode production",
    };
    scripts.insert("build".into(), json!(build));
    if options.include_storybook {
        scripts.insert("storybook".into(), json!("storybook dev -p 6006"));
        scripts.insert("build-storybook".into(), json!("storybook build"));
    }

    let mut package = Map::new();
    package.insert("name".into(), Value::String(options.package_name.clone()));
    package.insert("version".into(), Value::String(options.package_version.clone()));
    package.insert("description".into(), json!("A library of React components"));
    package.insert("main".into(), json!("dist/index.js"));
    package.insert("module".into(), json!("dist/index.esm.js"));
    if options.use_typescript {
        package.insert("types".into(), json!("dist/index.d.ts"));
    }
    package.insert("files".into(), json!(["dist"]));
    package.insert("scripts".into(), Value::Object(scripts));
    package.insert("keywords".into(), json!(["react", "component", "library", "ui"]));
    package.insert("license".into(), json!("MIT"));
    common::insert_dependencies(&mut package, manifest);
    package.insert(
        "peerDependencies".into(),
        json!({ "react": PEER_REACT, "react-dom": PEER_REACT }),
    );
    common::pretty_json(&Value::Object(package))
}

fn tsconfig() -> String {
    common::pretty_json(&json!({
        "compilerOptions": {
            "target": "es5",
            "lib": ["dom", "dom.iterable", "esnext"],
            "allowJs": true,
            "skipLibCheck": true,
            "esModuleInterop": true,
            "allowSyntheticDefaultImports": true,
            "strict": true,
            "forceConsistentCasingInFileNames": true,
            "module": "esnext",
            "moduleResolution": "node",
            "resolveJsonModule": true,
            "isolatedModules": true,
            "jsx": "react-jsx",
            "declaration": true,
            "declarationDir": "dist",
            "outDir": "dist"
        },
        "include": ["src/**/*"],
        "exclude": ["node_modules", "dist", "**/*.stories.*"]
    }))
}

fn rollup_config(ts: bool) -> String {
    let (ts_import, ts_plugin, ts_preset, input) = if ts {
        (
            "import typescript from '@rollup/plugin-typescript';\n",
            "    typescript(),\n",
            "        '@babel/preset-typescript',\n",
            "src/index.ts",
        )
    } else {
        ("", "", "", "src/index.js")
    };

    format!(
        r#"import resolve from '@rollup/plugin-node-resolve';
import commonjs from '@rollup/plugin-commonjs';
import babel from '@rollup/plugin-babel';
{ts_import}import {{ terser }} from 'rollup-plugin-terser';
import peerDepsExternal from 'rollup-plugin-peer-deps-external';
import pkg from './package.json';

export default {{
  input: '{input}',
  output: [
    {{ file: pkg.main, format: 'cjs', sourcemap: true }},
    {{ file: pkg.module, format: 'esm', sourcemap: true }},
  ],
  plugins: [
    peerDepsExternal(),
    resolve(),
    commonjs(),
{ts_plugin}    babel({{
      babelHelpers: 'bundled',
      exclude: 'node_modules/**',
      presets: [
        '@babel/preset-env',
        '@babel/preset-react',
{ts_preset}      ],
    }}),
    terser(),
  ],
  external: Object.keys(pkg.peerDependencies || {{}}),
}};
"#,
        ts_import = ts_import,
        ts_plugin = ts_plugin,
        ts_preset = ts_preset,
        input = input,
    )
}

fn webpack_config(options: &LibraryOptions) -> String {
    let ts = options.use_typescript;
    let (entry, extensions, ts_rule, ts_preset) = if ts {
        (
            "./src/index.ts",
            "['.js', '.jsx', '.ts', '.tsx']",
            "      {\n        test: /\\.tsx?$/,\n        use: 'ts-loader',\n        exclude: /node_modules/,\n      },\n",
            "              '@babel/preset-typescript',\n",
        )
    } else {
        ("./src/index.js", "['.js', '.jsx']", "", "")
    };

    format!(
        r#"const path = require('path');

module.exports = {{
  mode: 'production',
  entry: '{entry}',
  output: {{
    path: path.resolve(__dirname, 'dist'),
    filename: 'index.js',
    libraryTarget: 'umd',
    library: {library},
    umdNamedDefine: true,
    globalObject: 'this',
  }},
  resolve: {{
    extensions: {extensions},
  }},
  module: {{
    rules: [
{ts_rule}      {{
        test: /\.jsx?$/,
        exclude: /node_modules/,
        use: {{
          loader: 'babel-loader',
          options: {{
            presets: [
              '@babel/preset-env',
              '@babel/preset-react',
{ts_preset}            ],
          }},
        }},
      }},
    ],
  }},
  externals: {{
    react: 'React',
    'react-dom': 'ReactDOM',
  }},
}};
"#,
        entry = entry,
        library = js_string(&options.package_name),
        extensions = extensions,
        ts_rule = ts_rule,
        ts_preset = ts_preset,
    )
}

/// One Storybook page per component
fn story(n: &Named<'_>) -> String {
    format!(
        r#"import React from 'react';
import {{ {id} }} from '../src/components/{id}';

const Preview = {id};

export default {{
  title: {title},
  component: {id},
  parameters: {{
    layout: 'centered',
  }},
  tags: ['autodocs'],
}};

export const Default = () => <Preview />;

export const WithCustomProps = () => <Preview className="custom-class" />;
"#,
        id = n.identifier,
        title = js_string(&format!("Components/{}", n.component.name)),
    )
}

fn storybook_main(ext: &str) -> String {
    format!(
        r#"module.exports = {{
  stories: ['../stories/**/*.stories.{ext}'],
  addons: [
    '@storybook/addon-links',
    '@storybook/addon-essentials',
  ],
  framework: {{
    name: '@storybook/react-webpack5',
    options: {{}},
  }},
  docs: {{
    autodocs: true,
  }},
}};
"#,
        ext = ext
    )
}

const STORYBOOK_PREVIEW: &str = "export const parameters = {
  actions: { argTypesRegex: '^on[A-Z].*' },
  controls: {
    matchers: {
      color: /(background|color)$/i,
      date: /Date$/,
    },
  },
};
";

fn readme(named: &[Named<'_>], options: &LibraryOptions) -> String {
    let name = &options.package_name;
    let identifiers: Vec<&str> = named.iter().map(|n| n.identifier.as_str()).collect();
    let first = identifiers.first().copied().unwrap_or("Component");
    let storybook = if options.include_storybook {
        "4. Run Storybook: `npm run storybook`\n"
    } else {
        ""
    };

    format!(
        r#"# {name}

A library of reusable React components.

## Installation

```bash
npm install {name}
```

## Components

{components}

## Usage

```jsx
import {{ {imports} }} from '{name}';

const Preview = {first};

function App() {{
  return <Preview />;
}}
```

## Development

1. Clone the repository
2. Install dependencies: `npm install`
3. Build the library: `npm run build`
{storybook}
## License

MIT
"#,
        name = name,
        components = common::component_list(named),
        imports = identifiers.join(", "),
        first = first,
        storybook = storybook,
    )
}

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::error::GenerateError;
    use crate::options::{Bundler, ExportOptions, RawLibraryOptions};
    use crate::templates::{generate, GeneratedProject};

    fn project(raw: RawLibraryOptions) -> GeneratedProject {
        let components = vec![
            Component::new("Card", "Card.tsx", "export default function Card() {}"),
            Component::new("hero-banner", "hero-banner.tsx", "import clsx from 'clsx';"),
        ];
        let raw = RawLibraryOptions {
            package_name: Some("@acme/ui-kit".to_string()),
            ..raw
        };
        generate(&components, &ExportOptions::Library(raw.validate().unwrap())).unwrap()
    }

    #[test]
    fn test_module_files_and_barrel() {
        let project = project(RawLibraryOptions::default());
        let tree = &project.tree;

        assert_eq!(
            tree.text("src/components/card/card.tsx"),
            Some("export default function Card() {}")
        );
        assert_eq!(
            tree.text("src/components/heroBanner/index.ts"),
            Some("export { default as heroBanner } from './heroBanner';\n")
        );
        assert_eq!(
            tree.text("src/index.ts"),
            Some("export * from './components/card';\nexport * from './components/heroBanner';\n")
        );
        assert!(tree.contains("rollup.config.js"));
        assert!(tree.contains("tsconfig.json"));
        assert!(!tree.contains("webpack.config.js"));
    }

    #[test]
    fn test_component_named_index_rejected() {
        let components = vec![
            Component::new("Card", "Card.tsx", ""),
            Component::new("Index", "Index.tsx", "export default () => null;"),
        ];
        let options = RawLibraryOptions {
            package_name: Some("ui-kit".to_string()),
            ..Default::default()
        };
        let err = generate(&components, &ExportOptions::Library(options.validate().unwrap()))
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidName { ref name } if name == "Index"));
    }

    #[test]
    fn test_package_manifest() {
        let project = project(RawLibraryOptions {
            package_version: Some("2.3.4".to_string()),
            ..Default::default()
        });
        let pkg: serde_json::Value =
            serde_json::from_str(project.tree.text("package.json").unwrap()).unwrap();

        assert_eq!(pkg["name"], "@acme/ui-kit");
        assert_eq!(pkg["version"], "2.3.4");
        assert_eq!(pkg["types"], "dist/index.d.ts");
        assert_eq!(pkg["scripts"]["build"], "rollup -c");
        assert_eq!(pkg["scripts"]["storybook"], "storybook dev -p 6006");
        assert_eq!(pkg["dependencies"]["clsx"], "latest");
        assert_eq!(pkg["peerDependencies"]["react"], "^17.0.0 || ^18.0.0");
        assert!(pkg["devDependencies"]["@rollup/plugin-typescript"].is_string());
    }

    #[test]
    fn test_storybook_files() {
        let project = project(RawLibraryOptions::default());
        let story = project.tree.text("stories/heroBanner.stories.tsx").unwrap();
        assert!(story.contains("import { heroBanner } from '../src/components/heroBanner';"));
        assert!(story.contains("title: \"Components/hero-banner\""));
        assert!(project.tree.contains(".storybook/main.js"));
        assert_eq!(project.run_script.as_ref().unwrap().url, super::STORYBOOK_URL);

        let without = project_without_storybook();
        assert!(!without.tree.paths().any(|p| p.starts_with("stories/")));
        assert!(!without.tree.paths().any(|p| p.starts_with(".storybook/")));
        assert!(without.run_script.is_none());
    }

    fn project_without_storybook() -> GeneratedProject {
        project(RawLibraryOptions {
            include_storybook: Some(false),
            ..Default::default()
        })
    }

    #[test]
    fn test_webpack_javascript() {
        let project = project(RawLibraryOptions {
            bundler: Some(Bundler::Webpack),
            use_typescript: Some(false),
            ..Default::default()
        });
        let tree = &project.tree;
        assert!(tree.contains("webpack.config.js"));
        assert!(tree.contains("src/index.js"));
        assert!(tree.contains("src/components/card/card.jsx"));
        assert!(tree.contains("src/components/card/index.js"));
        assert!(!tree.contains("tsconfig.json"));

        let config = tree.text("webpack.config.js").unwrap();
        assert!(config.contains("library: \"@acme/ui-kit\","));
        assert!(!config.contains("ts-loader"));
        assert!(!project.manifest.dev_dependencies.contains_key("typescript"));
    }
}
