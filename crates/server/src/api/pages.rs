//! `/api/templates/pages` endpoints.

use nepostore_core::models::{Page, PageInput, PageSection};
use nepostore_core::types::PageId;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{ApiError, ScopedApi};

#[derive(Serialize)]
struct NewPage<'a> {
    title: &'a str,
    slug: String,
    sections: Vec<PageSection>,
}

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        self.get("/api/templates/pages").await
    }

    #[instrument(skip(self), fields(page_id = %id))]
    pub async fn get_page(&self, id: &PageId) -> Result<Page, ApiError> {
        self.get(&format!(
            "/api/templates/pages/{}",
            urlencoding::encode(id.as_str())
        ))
        .await
    }

    /// A published page by slug, if the tenant has one.
    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>, ApiError> {
        Ok(self
            .list_pages()
            .await?
            .into_iter()
            .find(|page| page.published && page.slug == slug))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_page(&self, input: &PageInput) -> Result<Page, ApiError> {
        input.validate()?;
        let body = NewPage {
            title: input.title.trim(),
            slug: input.effective_slug(),
            sections: Vec::new(),
        };
        self.send(Method::POST, "/api/templates/pages", &body).await
    }

    /// Save a page's title, slug and section list.
    #[instrument(skip(self, page), fields(page_id = %page.id, sections = page.sections.len()))]
    pub async fn save_page(&self, page: &Page) -> Result<(), ApiError> {
        let path = format!(
            "/api/templates/pages/{}",
            urlencoding::encode(page.id.as_str())
        );
        self.execute(Method::PUT, &path, page).await
    }

    #[instrument(skip(self), fields(page_id = %id))]
    pub async fn delete_page(&self, id: &PageId) -> Result<(), ApiError> {
        self.delete(&format!(
            "/api/templates/pages/{}",
            urlencoding::encode(id.as_str())
        ))
        .await
    }
}
