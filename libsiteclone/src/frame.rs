use serde::Deserialize;

/// Looks at the first `iframe` of the document. A same-origin frame hands
/// back its serialized document and url; a cross-origin one only its `src`.
pub const FRAME_PROBE_SCRIPT: &str = r#"(() => {
    const frame = document.querySelector('iframe');
    if (!frame) {
        return { found: false };
    }
    const src = frame.getAttribute('src');
    try {
        const doc = frame.contentDocument;
        if (doc && doc.documentElement) {
            const doctype = doc.doctype ? new XMLSerializer().serializeToString(doc.doctype) : '';
            return { found: true, src: src, url: doc.URL, html: doctype + doc.documentElement.outerHTML };
        }
    } catch (e) {}
    return { found: true, src: src };
})()"#;

#[derive(Debug, Default, Deserialize)]
pub struct FrameProbe {
    pub found: bool,
    pub src: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
}

/// Which document a capture should serialize.
#[derive(Debug, PartialEq)]
pub enum CaptureContext {
    MainDocument,
    /// The frame's document was readable from the outer page.
    Frame { html: String, url: String },
    /// The frame is cross-origin; its `src` has to be rendered on its own.
    CrossOriginFrame { src: String },
}

impl FrameProbe {
    pub fn into_context(self) -> CaptureContext {
        if !self.found {
            return CaptureContext::MainDocument;
        }
        match (self.html, self.url, self.src) {
            (Some(html), Some(url), _) => CaptureContext::Frame { html, url },
            (_, _, Some(src)) if !src.trim().is_empty() => CaptureContext::CrossOriginFrame { src },
            _ => CaptureContext::MainDocument,
        }
    }
}
