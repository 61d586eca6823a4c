//! Built-in starter project seeded when the store has nothing to restore.

pub const INDEX_HTML: &str = "index.html";
pub const STYLE_CSS: &str = "style.css";
pub const SCRIPT_JS: &str = "script.js";

const INDEX_HTML_CONTENT: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>DXCode Test</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <h1>Hello DXCode</h1>
  <p>Press Cmd/Ctrl + S to save the project!</p>
  <script src="script.js"></script>
</body>
</html>"#;

const STYLE_CSS_CONTENT: &str = "body {\n  background-color: #2e2e2e;\n  color: #cccccc;\n}";

const SCRIPT_JS_CONTENT: &str = r#"console.log("DXCode is ready!");"#;

/// Default files in creation order. The first one starts active.
pub const DEFAULT_FILES: [(&str, &str); 3] = [
    (INDEX_HTML, INDEX_HTML_CONTENT),
    (STYLE_CSS, STYLE_CSS_CONTENT),
    (SCRIPT_JS, SCRIPT_JS_CONTENT),
];
