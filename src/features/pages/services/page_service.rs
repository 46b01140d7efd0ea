//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and rendered with minijinja;
//! `.html` templates are auto-escaped, so untrusted file names are safe to
//! interpolate.

use minijinja::{context, Environment};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::files::FileService;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../../../../templates/pages/layout.html"),
    ),
    (
        "upload.html",
        include_str!("../../../../templates/pages/upload.html"),
    ),
    (
        "gallery.html",
        include_str!("../../../../templates/pages/gallery.html"),
    ),
    ("file.html", include_str!("../../../../templates/pages/file.html")),
];

pub struct PageService {
    env: Environment<'static>,
    file_service: Arc<FileService>,
    max_upload_size: usize,
}

impl PageService {
    pub fn new(
        file_service: Arc<FileService>,
        max_upload_size: usize,
    ) -> std::result::Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self {
            env,
            file_service,
            max_upload_size,
        })
    }

    /// Upload form
    pub fn render_index(&self) -> Result<String> {
        let max_upload_mb = self.max_upload_size as f64 / (1024.0 * 1024.0);
        Ok(self
            .env
            .get_template("upload.html")?
            .render(context! { max_upload_mb => format!("{:.1}", max_upload_mb) })?)
    }

    /// Gallery shell; the listing is fetched by the page itself
    pub fn render_gallery(&self) -> Result<String> {
        Ok(self.env.get_template("gallery.html")?.render(context! {})?)
    }

    pub async fn render_file(&self, id: i64) -> Result<String> {
        let file = self.file_service.get(id).await?;
        Ok(self
            .env
            .get_template("file.html")?
            .render(context! { file => file })?)
    }
}
