//! Next.js app with one route per component
//!
//! `router_mode` picks between the `app/` and `pages/` conventions. The
//! TypeScript, linter, and styling toggles each own a disjoint set of files.

use super::common::{self, js_string, REACT_VERSION};
use super::{ComponentEntry, GeneratedProject, GeneratedTree, Manifest, Named, RunScript};
use crate::error::GenerateError;
use crate::naming;
use crate::options::{FrameworkAppOptions, RouterMode};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

pub const DEV_SERVER_URL: &str = "http://localhost:3000";

/// Top-level routes the framework reserves for itself
const RESERVED_APP_ROUTES: &[&str] = &["api"];
const RESERVED_PAGES_ROUTES: &[&str] = &["api", "index", "404", "500"];

const TYPESCRIPT_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("@types/node", "^20.4.5"),
    ("@types/react", "^18.2.15"),
    ("@types/react-dom", "^18.2.7"),
    ("typescript", "^5.1.6"),
];

const STYLING_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("autoprefixer", "^10.4.14"),
    ("postcss", "^8.4.24"),
    ("tailwindcss", "^3.3.3"),
];

struct Route<'a> {
    named: &'a Named<'a>,
    slug: String,
}

pub fn generate(
    named: &[Named<'_>],
    options: &FrameworkAppOptions,
) -> Result<GeneratedProject, GenerateError> {
    let routes = routes(named, options.router_mode)?;
    let ext = if options.use_typescript { "tsx" } else { "jsx" };

    let base = [
        ("next", options.framework_version.as_str()),
        ("react", REACT_VERSION),
        ("react-dom", REACT_VERSION),
    ];
    let mut manifest = Manifest::new(&base, named);
    if options.use_typescript {
        manifest.dev(TYPESCRIPT_DEV_DEPENDENCIES);
    }
    if options.include_linter {
        manifest.dev(&[
            ("eslint", "^8.45.0"),
            ("eslint-config-next", options.framework_version.as_str()),
        ]);
    }
    if options.include_styling {
        manifest.dev(STYLING_DEV_DEPENDENCIES);
    }

    let mut tree = GeneratedTree::new();
    tree.insert_text("package.json", package_json(options, &manifest))?;
    tree.insert_text("next.config.js", NEXT_CONFIG)?;

    if options.use_typescript {
        tree.insert_text("tsconfig.json", tsconfig(options.router_mode))?;
        tree.insert_text("next-env.d.ts", NEXT_ENV_DTS)?;
    } else {
        tree.insert_text("jsconfig.json", JSCONFIG)?;
    }
    if options.include_linter {
        tree.insert_text(".eslintrc.json", ESLINTRC)?;
    }
    if options.include_styling {
        tree.insert_text("tailwind.config.js", TAILWIND_CONFIG)?;
        tree.insert_text("postcss.config.js", POSTCSS_CONFIG)?;
    }

    let mut components = Vec::with_capacity(named.len());
    for n in named {
        let path = format!("components/{}.{}", n.identifier, ext);
        let content = match options.router_mode {
            RouterMode::App => common::with_client_directive(&n.component.content),
            RouterMode::Pages => n.component.content.clone(),
        };
        tree.insert_text(path.clone(), content)?;
        components.push(ComponentEntry {
            name: n.component.name.clone(),
            identifier: n.identifier.clone(),
            path,
        });
    }

    match options.router_mode {
        RouterMode::App => {
            tree.insert_text("app/globals.css", globals_css(options.include_styling))?;
            tree.insert_text(format!("app/layout.{}", ext), app_layout(options.use_typescript))?;
            tree.insert_text(format!("app/page.{}", ext), index_page(&routes, false))?;
            for route in &routes {
                tree.insert_text(
                    format!("app/{}/page.{}", route.slug, ext),
                    component_page(route, "@/components", false),
                )?;
            }
        }
        RouterMode::Pages => {
            tree.insert_text("styles/globals.css", globals_css(options.include_styling))?;
            tree.insert_text(format!("pages/_app.{}", ext), pages_app(options.use_typescript))?;
            tree.insert_text(format!("pages/index.{}", ext), index_page(&routes, true))?;
            for route in &routes {
                tree.insert_text(
                    format!("pages/{}.{}", route.slug, ext),
                    component_page(route, "../components", true),
                )?;
            }
        }
    }

    tree.insert_text("README.md", readme(named, options.include_linter))?;
    common::insert_gitignore(&mut tree)?;

    Ok(GeneratedProject {
        tree,
        manifest,
        components,
        run_script: Some(RunScript {
            args: vec!["run", "dev"],
            url: DEV_SERVER_URL,
        }),
    })
}

/// Assign each component a route slug, rejecting clashes with each other
/// and with routes the framework owns.
fn routes<'a>(named: &'a [Named<'a>], mode: RouterMode) -> Result<Vec<Route<'a>>, GenerateError> {
    let reserved = match mode {
        RouterMode::App => RESERVED_APP_ROUTES,
        RouterMode::Pages => RESERVED_PAGES_ROUTES,
    };

    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut routes = Vec::with_capacity(named.len());
    for n in named {
        let slug = naming::to_slug(&n.component.name);
        if reserved.contains(&slug.as_str()) {
            return Err(GenerateError::RouteCollision {
                slug,
                first: "built-in route".to_string(),
                second: n.component.name.clone(),
            });
        }
        if let Some(first) = seen.get(&slug) {
            return Err(GenerateError::RouteCollision {
                slug,
                first: first.to_string(),
                second: n.component.name.clone(),
            });
        }
        seen.insert(slug.clone(), &n.component.name);
        routes.push(Route { named: n, slug });
    }
    Ok(routes)
}

fn package_json(options: &FrameworkAppOptions, manifest: &Manifest) -> String {
    let mut scripts = Map::new();
    scripts.insert("dev".into(), json!("next dev"));
    scripts.insert("build".into(), json!("next build"));
    scripts.insert("start".into(), json!("next start"));
    if options.include_linter {
        scripts.insert("lint".into(), json!("next lint"));
    }

    let mut package = Map::new();
    package.insert("name".into(), Value::String(options.app_name.clone()));
    package.insert("version".into(), json!("0.1.0"));
    package.insert("private".into(), json!(true));
    package.insert("scripts".into(), Value::Object(scripts));
    common::insert_dependencies(&mut package, manifest);
    common::pretty_json(&Value::Object(package))
}

fn tsconfig(mode: RouterMode) -> String {
    let mut compiler = json!({
        "target": "es5",
        "lib": ["dom", "dom.iterable", "esnext"],
        "allowJs": true,
        "skipLibCheck": true,
        "strict": true,
        "forceConsistentCasingInFileNames": true,
        "noEmit": true,
        "esModuleInterop": true,
        "module": "esnext",
        "moduleResolution": "node",
        "resolveJsonModule": true,
        "isolatedModules": true,
        "jsx": "preserve",
        "incremental": true,
        "paths": { "@/*": ["./*"] }
    });
    let mut include = vec![json!("next-env.d.ts"), json!("**/*.ts"), json!("**/*.tsx")];
    if mode == RouterMode::App {
        compiler["plugins"] = json!([{ "name": "next" }]);
        include.push(json!(".next/types/**/*.ts"));
    }

    common::pretty_json(&json!({
        "compilerOptions": compiler,
        "include": include,
        "exclude": ["node_modules"]
    }))
}

const NEXT_CONFIG: &str = "/** @type {import('next').NextConfig} */
const nextConfig = {}

module.exports = nextConfig
";

const NEXT_ENV_DTS: &str = "/// <reference types=\"next\" />
/// <reference types=\"next/image-types/global\" />

// NOTE: This file should not be edited
// see https://nextjs.org/docs/basic-features/typescript for more information.
";

const JSCONFIG: &str = "{
  \"compilerOptions\": {
    \"paths\": {
      \"@/*\": [\"./*\"]
    }
  }
}
";

const ESLINTRC: &str = "{
  \"extends\": \"next/core-web-vitals\"
}
";

const TAILWIND_CONFIG: &str = "/** @type {import('tailwindcss').Config} */
module.exports = {
  content: [
    './pages/**/*.{js,ts,jsx,tsx,mdx}',
    './components/**/*.{js,ts,jsx,tsx,mdx}',
    './app/**/*.{js,ts,jsx,tsx,mdx}',
  ],
  theme: {
    extend: {},
  },
  plugins: [],
}
";

const POSTCSS_CONFIG: &str = "module.exports = {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
}
";

fn globals_css(styling: bool) -> String {
    let body = "body {\n  margin: 0;\n  font-family: system-ui, -apple-system, 'Segoe UI', Roboto, sans-serif;\n}\n";
    if styling {
        format!("@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n{}", body)
    } else {
        body.to_string()
    }
}

fn app_layout(typescript: bool) -> String {
    let props = if typescript {
        "{\n  children,\n}: {\n  children: React.ReactNode\n}"
    } else {
        "{ children }"
    };
    format!(
        r#"import './globals.css'

export const metadata = {{
  title: 'Component Gallery',
  description: 'A gallery of React components',
}}

export default function RootLayout({props}) {{
  return (
    <html lang="en">
      <body>{{children}}</body>
    </html>
  )
}}
"#,
        props = props
    )
}

fn pages_app(typescript: bool) -> String {
    let (import, signature) = if typescript {
        (
            "import type { AppProps } from 'next/app'\n",
            "{ Component, pageProps }: AppProps",
        )
    } else {
        ("", "{ Component, pageProps }")
    };
    format!(
        r#"import '../styles/globals.css'
{import}
export default function App({signature}) {{
  return <Component {{...pageProps}} />
}}
"#,
        import = import,
        signature = signature
    )
}

/// Navigation page linking every component route
fn index_page(routes: &[Route<'_>], pages_router: bool) -> String {
    let links: Vec<String> = routes
        .iter()
        .map(|r| {
            format!(
                "          <li key={{{key}}} className=\"mb-2\">\n            <Link href={{{href}}} className=\"text-blue-500 hover:underline\">\n              {{{key}}}\n            </Link>\n          </li>",
                key = js_string(&r.named.component.name),
                href = js_string(&format!("/{}", r.slug)),
            )
        })
        .collect();

    let (head_import, head) = if pages_router {
        (
            "import Head from 'next/head'\n",
            "      <Head>\n        <title>Component Gallery</title>\n      </Head>\n\n",
        )
    } else {
        ("", "")
    };

    format!(
        r#"{head_import}import Link from 'next/link'

export default function Home() {{
  return (
    <div className="container mx-auto px-4 py-8">
{head}      <h1 className="text-3xl font-bold mb-6">Component Gallery</h1>

      <div className="bg-white p-6 rounded-lg shadow-md">
        <h2 className="text-xl font-semibold mb-4">Available Components</h2>

        <ul className="list-disc pl-6">
{links}
        </ul>
      </div>
    </div>
  )
}}
"#,
        head_import = head_import,
        head = head,
        links = links.join("\n"),
    )
}

/// One routed page rendering a single component
fn component_page(route: &Route<'_>, components_dir: &str, pages_router: bool) -> String {
    let ident = &route.named.identifier;
    let title = js_string(&route.named.component.name);
    let (head_import, head) = if pages_router {
        (
            "import Head from 'next/head'\n",
            format!("      <Head>\n        <title>{{{}}}</title>\n      </Head>\n\n", title),
        )
    } else {
        ("", String::new())
    };

    format!(
        r#"import Link from 'next/link'
{head_import}import {ident} from '{dir}/{ident}'

const Preview = {ident}

export default function ComponentPage() {{
  return (
    <div className="container mx-auto px-4 py-8">
{head}      <Link href="/" className="text-blue-500 hover:underline mb-4 inline-block">
        ← Back to all components
      </Link>

      <h1 className="text-3xl font-bold mb-6">{{{title}}}</h1>

      <div className="border border-gray-300 rounded-lg p-6 bg-white">
        <Preview />
      </div>
    </div>
  )
}}
"#,
        head_import = head_import,
        head = head,
        ident = ident,
        dir = components_dir,
        title = title,
    )
}

fn readme(named: &[Named<'_>], linter: bool) -> String {
    let lint = if linter {
        "\n- `npm run lint` - Lints the codebase"
    } else {
        ""
    };
    format!(
        r#"# Next.js Component Gallery

A gallery of React components built with Next.js.

## Included Components

{components}

## Getting Started

1. Install dependencies:
   ```
   npm install
   ```

2. Start the development server:
   ```
   npm run dev
   ```

3. Open [{url}]({url}) to view the application.

## Available Scripts

- `npm run dev` - Runs the app in development mode
- `npm run build` - Builds the app for production
- `npm start` - Runs the built app in production mode{lint}
"#,
        components = common::component_list(named),
        url = DEV_SERVER_URL,
        lint = lint,
    )
}
