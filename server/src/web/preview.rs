use crate::i18n::Strings;

/// The `/` page: the live banner, reloaded every `ttl` seconds, plus the
/// endpoint list.
pub fn preview_page(strings: &Strings, ttl: u64) -> String {
    let refresh_ms = ttl.max(1) * 1000;
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
      background: #0d1117; color: #e6edf3;
      display: flex; flex-direction: column; align-items: center; justify-content: center;
      min-height: 100vh; padding: 20px;
    }}
    h1 {{ font-size: 1.5rem; margin-bottom: 10px; color: #58a6ff; }}
    p {{ color: #8b949e; margin-bottom: 20px; font-size: 0.9rem; }}
    .banner {{ border: 1px solid #30363d; border-radius: 12px; overflow: hidden; box-shadow: 0 8px 32px rgba(0,0,0,0.4); }}
    img {{ display: block; max-width: 100%; height: auto; }}
    .info {{ margin-top: 20px; background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px 20px; max-width: 600px; width: 100%; }}
    .info h2 {{ font-size: 1rem; color: #58a6ff; margin-bottom: 8px; }}
    .info code {{ background: #0d1117; padding: 2px 6px; border-radius: 4px; color: #7ee787; font-size: 0.85rem; }}
    .info p {{ margin: 6px 0; }}
    button {{ margin-top: 12px; background: #238636; color: #fff; border: none; padding: 8px 18px; border-radius: 6px; cursor: pointer; font-size: 0.85rem; }}
    button:hover {{ background: #2ea043; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p>{subtitle} &bull; Auto-Refresh {ttl}s</p>
  <div class="banner"><img id="banner" src="/banner.png" alt="{title}"></div>
  <div class="info">
    <h2>{endpoints}</h2>
    <p>Banner: <code>/banner.png</code></p>
    <p>Server info: <code>/api/info</code></p>
    <p>Clients: <code>/api/clients</code></p>
    <p>Channels: <code>/api/channels</code></p>
    <p>Health: <code>/health</code></p>
    <button onclick="reloadBanner()">{refresh}</button>
  </div>
  <script>
    function reloadBanner() {{
      document.getElementById('banner').src = '/banner.png?t=' + Date.now();
    }}
    setInterval(reloadBanner, {refresh_ms});
  </script>
</body>
</html>"#,
        lang = strings.code,
        title = strings.preview_title,
        subtitle = strings.preview_subtitle,
        endpoints = strings.preview_endpoints,
        refresh = strings.preview_refresh,
    )
}
