//! 产物打包：把{标题, html, css, js}组装为可托管的三个文件

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 模型生成的页面四元组，缺失字段按空字符串处理
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageFiles {
    /// 页面标题
    #[serde(default)]
    pub page_title: String,
    /// `<body>`内部的HTML片段
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
}

/// 打包后的文件内容
#[derive(Debug, Clone, PartialEq)]
pub struct PackagedArtifact {
    pub html: String,
    pub css: String,
    pub javascript: String,
}

/// 上传时的文件名与Content-Type
pub const INDEX_FILE: (&str, &str) = ("index.html", "text/html");
pub const STYLES_FILE: (&str, &str) = ("styles.css", "text/css");
pub const SCRIPT_FILE: (&str, &str) = ("app.js", "application/javascript");

impl PackagedArtifact {
    /// (文件名, 内容, Content-Type)，index.html在前
    pub fn files(&self) -> [(&'static str, &str, &'static str); 3] {
        [
            (INDEX_FILE.0, self.html.as_str(), INDEX_FILE.1),
            (STYLES_FILE.0, self.css.as_str(), STYLES_FILE.1),
            (SCRIPT_FILE.0, self.javascript.as_str(), SCRIPT_FILE.1),
        ]
    }
}

/// 纯函数，相同输入得到字节一致的输出
pub fn package(page: &PageFiles) -> PackagedArtifact {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="./styles.css">
</head>
<body>
    <div class="component-container">
        {body}
    </div>

    <script src="./app.js"></script>
    <script>
        document.addEventListener('DOMContentLoaded', function() {{
            if (window.initializeComponent) {{
                window.initializeComponent('1');
            }}
        }});
    </script>
</body>
</html>
"#,
        title = escape_title(&page.page_title),
        body = page.html,
    );

    PackagedArtifact {
        html,
        css: page.css.clone(),
        javascript: page.js.clone(),
    }
}

fn escape_title(title: &str) -> String {
    title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageFiles {
        PageFiles {
            page_title: "Revenue".to_string(),
            html: "<section id=\"chart\"></section>".to_string(),
            css: ".a { color: red; }".to_string(),
            js: "window.initializeComponent = () => {};".to_string(),
        }
    }

    #[test]
    fn test_package_wraps_fragment_in_boilerplate() {
        let artifact = package(&page());

        assert!(artifact.html.starts_with("<!DOCTYPE html>"));
        assert!(artifact.html.contains("<title>Revenue</title>"));
        assert!(artifact.html.contains(r#"<link rel="stylesheet" href="./styles.css">"#));
        assert!(artifact.html.contains(r#"<script src="./app.js"></script>"#));
        assert!(artifact.html.contains("window.initializeComponent('1');"));
        assert!(artifact.html.contains(
            "<div class=\"component-container\">\n        <section id=\"chart\"></section>"
        ));
        assert_eq!(artifact.css, ".a { color: red; }");
        assert_eq!(artifact.javascript, "window.initializeComponent = () => {};");
    }

    #[test]
    fn test_package_is_deterministic() {
        assert_eq!(package(&page()), package(&page()));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let parsed: PageFiles = serde_json::from_str(r#"{"html": "<p>x</p>"}"#).unwrap();
        let artifact = package(&parsed);

        assert!(artifact.html.contains("<title></title>"));
        assert!(artifact.css.is_empty());
        assert!(artifact.javascript.is_empty());
    }

    #[test]
    fn test_title_is_escaped() {
        let artifact = package(&PageFiles {
            page_title: "<b>A & B</b>".to_string(),
            ..PageFiles::default()
        });
        assert!(artifact.html.contains("<title>&lt;b&gt;A &amp; B&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_files_order_and_content_types() {
        let artifact = package(&page());
        let files = artifact.files();

        assert_eq!(files[0].0, "index.html");
        assert_eq!(files[0].2, "text/html");
        assert_eq!(files[1].2, "text/css");
        assert_eq!(files[2].0, "app.js");
        assert_eq!(files[2].2, "application/javascript");
    }
}
