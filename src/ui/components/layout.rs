//! Full-screen kiosk layout shared by the TV and setup pages.

use dioxus::prelude::*;

/// Escaping helper shared by page scripts.
const SHARED_JS: &str = r#"
function esc(s) { return String(s || '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'})[c]); }
"#;

const BASE_STYLES: &str = r#"
html, body { height: 100%; margin: 0; }
body { background: #020617; color: #e2e8f0; font-family: 'Inter', system-ui, sans-serif; overflow: hidden; }
.empty-state { display: flex; flex-direction: column; align-items: center; justify-content: center; height: 100%; opacity: .35; gap: 1rem; }
.empty-state i { font-size: 4rem; }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct KioskLayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    pub children: Element,
    /// Page-specific CSS
    #[props(default)]
    pub styles: Option<String>,
    /// Page-specific script, appended at the end of the body
    #[props(default)]
    pub scripts: Option<String>,
}

#[component]
pub fn KioskLayout(props: KioskLayoutProps) -> Element {
    let version = env!("TVB_VERSION");

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            meta { name: "generator", content: "facility-tv-board {version}" }
            title { "{props.title}" }
            link {
                rel: "stylesheet",
                href: "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
            }
            style { {BASE_STYLES} }
            if let Some(styles) = props.styles {
                style { {styles} }
            }
            script { dangerous_inner_html: SHARED_JS }
        }
        body {
            {props.children}
            if let Some(scripts) = props.scripts {
                script { dangerous_inner_html: "{scripts}" }
            }
        }
    }
}
