// Render module: server-side HTML pages and the Daily Pulse text export.

pub mod html;
pub mod pages;
pub mod pulse;

pub use pages::{
    render_delta_page, render_error_page, render_fusion_page, render_gamma_page,
    render_portal_page, render_pulse_page,
};
pub use pulse::{newsletter_to_text, text_filename};
