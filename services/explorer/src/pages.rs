//! Server-rendered HTML for the dashboard.

use explorer_common::DateId;

/// Title shown on the home page.
pub const HOME_TITLE: &str = "Strona główna";

const HOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pl">
<head>
    <meta charset="UTF-8">
    <title>{{title}}</title>
    <style>
        body { font-family: sans-serif; margin: 2rem; }
        ul.dates { columns: 4; }
        #plots img { max-width: 640px; }
    </style>
</head>
<body>
    <h1>{{title}}</h1>
    <ul class="dates">
{{dates}}    </ul>
    <div id="plots"></div>
    <script>
        (function () {
            var proto = location.protocol === "https:" ? "wss://" : "ws://";
            var socket = new WebSocket(proto + location.host + "/socket");
            var plots = document.getElementById("plots");
            socket.onmessage = function (msg) {
                var payload = JSON.parse(msg.data);
                if (payload.event !== "image available") return;
                var item = document.createElement("div");
                item.id = "plot-" + payload.data.id + "-" + payload.data.classes;
                item.innerHTML = payload.data.html;
                plots.appendChild(item);
            };
        })();
    </script>
</body>
</html>
"#;

/// Render the home page listing the available dataset dates.
pub fn render_home(dates: &[DateId]) -> String {
    let items: String = dates
        .iter()
        .map(|d| format!("        <li data-dateid=\"{}\">{}</li>\n", d, d.pretty()))
        .collect();

    HOME_TEMPLATE
        .replace("{{title}}", HOME_TITLE)
        .replace("{{dates}}", &items)
}

/// Render a directory index for a path below the cache directory.
pub fn render_directory_index(url_path: &str, entries: &[(String, bool)]) -> String {
    let base = url_path.trim_end_matches('/');
    let title = escape_html(if url_path.is_empty() { "/" } else { url_path });

    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>listing directory {title}</title></head>\n<body>\n<h1>{title}</h1>\n<ul>\n"
    );
    if !base.is_empty() {
        html.push_str("<li><a href=\"../\">..</a></li>\n");
    }
    for (name, is_dir) in entries {
        let suffix = if *is_dir { "/" } else { "" };
        let name = escape_html(name);
        html.push_str(&format!(
            "<li><a href=\"{base}/{name}{suffix}\">{name}{suffix}</a></li>\n"
        ));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
