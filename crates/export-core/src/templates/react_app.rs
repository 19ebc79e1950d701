//! Single-page React app with a component gallery

use super::common::{self, js_string, REACT_VERSION};
use super::{ComponentEntry, GeneratedProject, GeneratedTree, Manifest, Named, RunScript};
use crate::error::GenerateError;
use crate::options::{ReactAppOptions, UiLibrary};
use serde_json::{json, Map, Value};

pub const DEV_SERVER_URL: &str = "http://localhost:3000";

const TAILWIND_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("autoprefixer", "^10.4.14"),
    ("postcss", "^8.4.24"),
    ("tailwindcss", "^3.3.3"),
];

/// Packages always declared, whatever the components import
pub fn base_dependencies(options: &ReactAppOptions) -> Vec<(&'static str, &'static str)> {
    let mut base = vec![("react", REACT_VERSION), ("react-dom", REACT_VERSION)];
    match options.ui_library {
        UiLibrary::None => {}
        UiLibrary::Mui => base.extend([
            ("@emotion/react", "^11.11.1"),
            ("@emotion/styled", "^11.11.0"),
            ("@mui/icons-material", "^5.14.5"),
            ("@mui/material", "^5.14.5"),
        ]),
        UiLibrary::Chakra => base.extend([
            ("@chakra-ui/react", "^2.8.0"),
            ("@emotion/react", "^11.11.1"),
            ("@emotion/styled", "^11.11.0"),
            ("framer-motion", "^10.16.1"),
        ]),
    }
    base
}

pub fn generate(
    named: &[Named<'_>],
    options: &ReactAppOptions,
) -> Result<GeneratedProject, GenerateError> {
    let mut manifest = Manifest::new(&base_dependencies(options), named);
    manifest.dev(&[("react-scripts", "5.0.1")]);
    if options.tailwind {
        manifest.dev(TAILWIND_DEV_DEPENDENCIES);
    }

    let mut tree = GeneratedTree::new();
    tree.insert_text("package.json", package_json(options, &manifest))?;
    tree.insert_text("public/index.html", index_html(&options.app_name))?;
    tree.insert_text("src/index.js", INDEX_JS)?;
    tree.insert_text("src/index.css", index_css(options.tailwind))?;

    let mut components = Vec::with_capacity(named.len());
    for n in named {
        let ext = if n.component.is_typescript() { "tsx" } else { "jsx" };
        let path = format!("src/components/{}.{}", n.identifier, ext);
        tree.insert_text(path.clone(), n.component.content.clone())?;
        components.push(ComponentEntry {
            name: n.component.name.clone(),
            identifier: n.identifier.clone(),
            path,
        });
    }

    tree.insert_text("src/App.js", app_js(named))?;

    if options.tailwind {
        tree.insert_text("tailwind.config.js", TAILWIND_CONFIG)?;
        tree.insert_text("postcss.config.js", POSTCSS_CONFIG)?;
    }

    tree.insert_text("README.md", readme(named))?;
    common::insert_gitignore(&mut tree)?;

    Ok(GeneratedProject {
        tree,
        manifest,
        components,
        run_script: Some(RunScript {
            args: vec!["start"],
            url: DEV_SERVER_URL,
        }),
    })
}

fn package_json(options: &ReactAppOptions, manifest: &Manifest) -> String {
    let mut package = Map::new();
    package.insert("name".into(), Value::String(options.app_name.clone()));
    package.insert("version".into(), json!("0.1.0"));
    package.insert("private".into(), json!(true));
    common::insert_dependencies(&mut package, manifest);
    package.insert(
        "scripts".into(),
        json!({
            "start": "react-scripts start",
            "build": "react-scripts build",
            "test": "react-scripts test",
            "eject": "react-scripts eject"
        }),
    );
    package.insert(
        "eslintConfig".into(),
        json!({ "extends": ["react-app", "react-app/jest"] }),
    );
    package.insert(
        "browserslist".into(),
        json!({
            "production": [">0.2%", "not dead", "not op_mini all"],
            "development": [
                "last 1 chrome version",
                "last 1 firefox version",
                "last 1 safari version"
            ]
        }),
    );
    common::pretty_json(&Value::Object(package))
}

fn index_html(app_name: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="theme-color" content="#000000" />
    <meta name="description" content="{name}" />
    <title>{name}</title>
  </head>
  <body>
    <noscript>You need to enable JavaScript to run this app.</noscript>
    <div id="root"></div>
  </body>
</html>
"##,
        name = html_escape(app_name)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_JS: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import './index.css';
import App from './App';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
";

const BODY_CSS: &str = "body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen',
    'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue',
    sans-serif;
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
}

code {
  font-family: source-code-pro, Menlo, Monaco, Consolas, 'Courier New',
    monospace;
}
";

fn index_css(tailwind: bool) -> String {
    if tailwind {
        format!("@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n{}", BODY_CSS)
    } else {
        BODY_CSS.to_string()
    }
}

const TAILWIND_CONFIG: &str = "/** @type {import('tailwindcss').Config} */
module.exports = {
  content: [
    \"./src/**/*.{js,jsx,ts,tsx}\",
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
  }
}
";

/// Gallery root: imports every component and switches between them with a
/// dropdown, starting on the first one.
fn app_js(named: &[Named<'_>]) -> String {
    let imports: Vec<String> = named
        .iter()
        .map(|n| format!("import {id} from './components/{id}';", id = n.identifier))
        .collect();

    let entries: Vec<String> = named
        .iter()
        .map(|n| format!("  {}: {},", js_string(&n.component.name), n.identifier))
        .collect();

    let options: Vec<String> = named
        .iter()
        .map(|n| {
            let name = js_string(&n.component.name);
            format!(
                "            <option key={{{name}}} value={{{name}}}>{{{name}}}</option>",
                name = name
            )
        })
        .collect();

    let first = named
        .first()
        .map(|n| js_string(&n.component.name))
        .unwrap_or_else(|| "''".to_string());

    format!(
        r#"import React, {{ useState }} from 'react';
{imports}

const components = {{
{entries}
}};

function App() {{
  const [activeComponent, setActiveComponent] = useState({first});

  const ActiveComponent = components[activeComponent];

  return (
    <div className="container mx-auto p-4">
      <h1 className="text-3xl font-bold mb-6 text-center">Component Gallery</h1>

      <div className="mb-6">
        <label className="block mb-2 font-semibold">Select a Component:</label>
        <select
          className="border border-gray-300 rounded px-3 py-2 w-full"
          value={{activeComponent}}
          onChange={{(e) => setActiveComponent(e.target.value)}}
        >
{options}
        </select>
      </div>

      <div className="border border-gray-300 rounded-lg p-4 bg-white">
        <h2 className="text-xl font-bold mb-4">{{activeComponent}}</h2>
        <div className="component-container">
          {{ActiveComponent && <ActiveComponent />}}
        </div>
      </div>
    </div>
  );
}}

export default App;
"#,
        imports = imports.join("\n"),
        entries = entries.join("\n"),
        first = first,
        options = options.join("\n"),
    )
}

fn readme(named: &[Named<'_>]) -> String {
    format!(
        r#"# Component Gallery

This is a React application that displays a collection of components.

## Included Components

{components}

## Getting Started

1. Install dependencies:
   ```
   npm install
   ```

2. Start the development server:
   ```
   npm start
   ```

3. Open [{url}]({url}) to view the application.

## Available Scripts

- `npm start` - Runs the app in development mode
- `npm test` - Launches the test runner
- `npm run build` - Builds the app for production
- `npm run eject` - Ejects from Create React App
"#,
        components = common::component_list(named),
        url = DEV_SERVER_URL,
    )
}
