//! Client bootstrap script injection.
//!
//! # Responsibilities
//! - Build the inline script that patches installed-app detection and queues
//!   a deferred install prompt for the mirrored page
//! - Insert it immediately after the first `<head …>` opening tag
//!
//! # Design Decisions
//! - The mirrored page treats "already installed" as a terminal state, so the
//!   display-mode media query is forced to report false
//! - A placeholder `beforeinstallprompt` event is dispatched right away so the
//!   page renders its install UI without waiting for the browser; the genuine
//!   browser event takes over whenever it fires
//! - A placeholder `prompt()` call waits up to 10s for the genuine event and
//!   rejects if it never arrives
//! - No `<head>` tag means no injection; the body passes through unchanged

/// Milliseconds a placeholder prompt() waits for the genuine browser event.
const PROMPT_TIMEOUT_MS: u32 = 10_000;

/// Delay before the placeholder is re-delivered, outlasting the mirrored
/// page's own "reset the stored prompt to null" pass shortly after load.
const REDELIVER_DELAY_MS: u32 = 1_500;

/// Build the bootstrap script block.
pub fn bootstrap_script() -> String {
    format!(
        r#"<script>(function () {{
  var genuine = null;
  var waiters = [];
  var nativeMatchMedia = window.matchMedia.bind(window);
  window.matchMedia = function (query) {{
    var result = nativeMatchMedia(query);
    if (typeof query === "string" && query.indexOf("display-mode") !== -1) {{
      try {{
        Object.defineProperty(result, "matches", {{ get: function () {{ return false; }} }});
      }} catch (e) {{}}
    }}
    return result;
  }};
  if (window.navigator && "standalone" in window.navigator) {{
    try {{
      Object.defineProperty(window.navigator, "standalone", {{ get: function () {{ return false; }} }});
    }} catch (e) {{}}
  }}
  function makePlaceholder() {{
    var evt;
    try {{
      evt = new Event("beforeinstallprompt", {{ cancelable: true }});
    }} catch (e) {{
      evt = document.createEvent("Event");
      evt.initEvent("beforeinstallprompt", false, true);
    }}
    evt.__mirrorPlaceholder = true;
    evt.platforms = [];
    evt.userChoice = new Promise(function () {{}});
    evt.prompt = function () {{
      if (genuine) {{ return genuine.prompt(); }}
      return new Promise(function (resolve, reject) {{
        var timer = setTimeout(function () {{
          reject(new Error("install prompt unavailable"));
        }}, {timeout});
        waiters.push(function (real) {{
          clearTimeout(timer);
          real.prompt().then(resolve, reject);
        }});
      }});
    }};
    return evt;
  }}
  window.addEventListener("beforeinstallprompt", function (evt) {{
    if (evt.__mirrorPlaceholder) {{ return; }}
    genuine = evt;
    waiters.splice(0).forEach(function (notify) {{ notify(evt); }});
  }}, true);
  var placeholder = makePlaceholder();
  var deliver = function () {{
    if (!genuine) {{ window.dispatchEvent(placeholder); }}
  }};
  if (document.readyState !== "loading") {{
    setTimeout(deliver, 0);
  }} else {{
    document.addEventListener("DOMContentLoaded", function () {{ setTimeout(deliver, 0); }});
  }}
  setTimeout(deliver, {redeliver});
}})();</script>"#,
        timeout = PROMPT_TIMEOUT_MS,
        redeliver = REDELIVER_DELAY_MS,
    )
}

/// Insert the bootstrap script immediately after the first `<head …>` tag.
pub fn inject_bootstrap(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    // "<head" must not match "<header"
    let open = lower.match_indices("<head").find_map(|(i, _)| {
        match lower.as_bytes().get(i + 5) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => Some(i),
            _ => None,
        }
    });
    let Some(open) = open else {
        return html.to_string();
    };
    let Some(close) = lower[open..].find('>') else {
        return html.to_string();
    };
    let insert_at = open + close + 1;

    let script = bootstrap_script();
    let mut out = String::with_capacity(html.len() + script.len());
    out.push_str(&html[..insert_at]);
    out.push_str(&script);
    out.push_str(&html[insert_at..]);
    out
}
