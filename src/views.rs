//! Embedded Tera templates and static assets.
//!
//! Templates are compiled into the binary so the server and the CLI report
//! need no files next to the executable.

use rust_embed::Embed;
use tera::{Context, Tera};

use crate::error::{AppError, Result};

#[derive(Embed)]
#[folder = "templates/"]
struct Templates;

/// Stylesheets served under `/static` and inlined into standalone reports.
#[derive(Embed)]
#[folder = "static/"]
pub struct Assets;

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut sources = Vec::new();
        for file in Templates::iter() {
            let name = file.as_ref();
            let content = Templates::get(name)
                .ok_or_else(|| AppError::Internal(format!("Template {} not found", name)))?;
            let source = std::str::from_utf8(&content.data)
                .map_err(|e| AppError::Internal(format!("Invalid UTF-8 in template {}: {}", name, e)))?
                .to_string();
            sources.push((name.to_string(), source));
        }

        // Added together so `extends` and `include` resolve regardless of order.
        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;

        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }

    pub fn stylesheet() -> Result<String> {
        let asset = Assets::get("style.css")
            .ok_or_else(|| AppError::Internal("Asset style.css not found".to_string()))?;
        let css = std::str::from_utf8(&asset.data)
            .map_err(|e| AppError::Internal(format!("Invalid UTF-8 in style.css: {}", e)))?;
        Ok(css.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_renders_with_minimal_context() {
        let views = Views::new().unwrap();
        let mut context = Context::new();
        context.insert("repos", &Vec::<serde_json::Value>::new());
        context.insert("metrics", &Vec::<serde_json::Value>::new());
        context.insert("repo_url", "octocat/Hello-World");

        for page in ["index.html", "track.html", "repo_list.html", "results.html"] {
            let html = views.render(page, &context).unwrap();
            assert!(html.contains("EngageTrack"), "{page}");
        }
    }

    #[test]
    fn stylesheet_is_embedded() {
        assert!(Views::stylesheet().unwrap().contains(".bar"));
    }
}
