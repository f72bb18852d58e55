use crate::engine::container::Container;
use crate::engine::panel::{Panel, PanelContext, PanelError, PanelView};
use crate::engine::registry::{Disposer, ToolDescriptor};

use super::{NMRIUM_VIEWER, reject_unknown};

pub const FRAME_HEIGHT: u32 = 700;

pub fn descriptor(frame_url: String) -> ToolDescriptor {
    ToolDescriptor::new(NMRIUM_VIEWER, "NMR Viewer", move |container| {
        init(container, frame_url.clone())
    })
}

/// Mounts the viewer and requests its frame, so an unreachable viewer turns into an inline error.
pub fn init(container: &mut Container, frame_url: String) -> Option<Disposer> {
    container.mount(Box::new(NmrPanel::new(frame_url.clone())));
    container.request_load(vec![frame_url]);
    let token = container.cancel_token();
    Some(Box::new(move || token.cancel()))
}

/// Embeds the NMRium viewer frame.
#[derive(Debug, Clone)]
pub struct NmrPanel {
    frame_url: String,
    ready: bool,
}

impl NmrPanel {
    pub fn new(frame_url: String) -> Self {
        Self {
            frame_url,
            ready: false,
        }
    }
}

impl Panel for NmrPanel {
    fn title(&self) -> &str {
        "NMRium Viewer"
    }

    fn view(&self) -> PanelView {
        let status = if self.ready {
            format!("Frame: {} ({FRAME_HEIGHT} px tall)", self.frame_url)
        } else {
            format!("Loading {}…", self.frame_url)
        };
        PanelView {
            title: self.title().to_string(),
            description: "Drag & drop JCAMP-DX (.jdx) or NMRium JSON files anywhere inside the \
                          viewer, or paste a direct URL into the address bar of the viewer itself."
                .to_string(),
            notes: vec![status],
            ..PanelView::default()
        }
    }

    fn input(&mut self, field: &str, _value: &str, _cx: &mut PanelContext) -> Result<(), PanelError> {
        reject_unknown(field)
    }

    fn sources_loaded(&mut self, sources: &[String], _cx: &mut PanelContext) {
        if sources.contains(&self.frame_url) {
            self.ready = true;
        }
    }
}
