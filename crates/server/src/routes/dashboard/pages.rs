//! Custom shop pages and the page builder.
//!
//! Each builder edit loads the page, applies one change to its section
//! list, and saves the whole page back.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::models::{MoveDirection, Page, PageInput, PageSection, SectionKind};
use nepostore_core::store::StoreEvent;
use nepostore_core::types::PageId;
use tracing::instrument;

use super::Chrome;
use super::users::required;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/pages";

fn builder_path(id: &str) -> String {
    format!("/page-builder/{}", urlencoding::encode(id))
}

#[derive(Debug, Clone)]
pub struct PageRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub sections: usize,
    pub published: bool,
    pub builder_href: String,
    pub shop_path: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/pages.html")]
pub struct PagesTemplate {
    pub chrome: Chrome,
    pub pages: Vec<PageRow>,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let (pages, notice) = recover(ctx.api.list_pages().await, "pages")?;
    Ok(PagesTemplate {
        chrome: Chrome::new(&ctx, "Pages").with_notice(notice),
        pages: pages
            .into_iter()
            .map(|page| PageRow {
                builder_href: builder_path(page.id.as_str()),
                shop_path: format!("/{}", page.slug),
                id: page.id.to_string(),
                sections: page.sections.len(),
                title: page.title,
                slug: page.slug,
                published: page.published,
            })
            .collect(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    match form.text("action") {
        Some("create") => {
            let input = PageInput {
                title: form.text("title").unwrap_or_default().to_string(),
                slug: form.text("slug").unwrap_or_default().to_string(),
            };
            match ctx.api.create_page(&input).await {
                Ok(page) => {
                    ctx.publish(|tenant| StoreEvent::PagesUpdated { tenant }).await;
                    Ok(ctx.success(&builder_path(page.id.as_str()), "Page created"))
                }
                Err(err) => ctx.finish(PATH, Err(err.into())),
            }
        }
        Some("delete") => {
            let outcome = delete(&ctx, &form).await;
            ctx.finish(PATH, outcome)
        }
        _ => ctx.finish(PATH, Err(AppError::BadRequest("Unknown action".to_string()))),
    }
}

async fn delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = PageId::from(required(form, "id")?);
    ctx.api.delete_page(&id).await?;
    ctx.publish(|tenant| StoreEvent::PagesUpdated { tenant }).await;
    Ok("Page deleted".to_string())
}

// =============================================================================
// Builder
// =============================================================================

/// One section flattened for its edit form.
#[derive(Debug, Clone, Default)]
pub struct SectionView {
    pub index: usize,
    pub kind: &'static str,
    pub label: &'static str,
    pub is_first: bool,
    pub is_last: bool,
    pub heading: String,
    pub subheading: String,
    pub image: String,
    pub cta_label: String,
    pub cta_url: String,
    pub body: String,
    pub section: String,
    pub limit: usize,
    pub url: String,
    pub alt: String,
    pub link: String,
}

impl SectionView {
    fn new(index: usize, len: usize, section: &PageSection) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let kind = section.kind();
        let base = Self {
            index,
            kind: kind.as_str(),
            label: kind.label(),
            is_first: index == 0,
            is_last: index + 1 == len,
            ..Self::default()
        };
        match section {
            PageSection::Hero {
                heading,
                subheading,
                image,
                cta_label,
                cta_url,
            } => Self {
                heading: heading.clone(),
                subheading: text(subheading),
                image: text(image),
                cta_label: text(cta_label),
                cta_url: text(cta_url),
                ..base
            },
            PageSection::Text { heading, body } => Self {
                heading: text(heading),
                body: body.clone(),
                ..base
            },
            PageSection::ProductGrid {
                heading,
                section,
                limit,
            } => Self {
                heading: text(heading),
                section: text(section),
                limit: *limit,
                ..base
            },
            PageSection::Image { url, alt, link } => Self {
                url: url.clone(),
                alt: text(alt),
                link: text(link),
                ..base
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct KindOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/page_builder.html")]
pub struct BuilderTemplate {
    pub chrome: Chrome,
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub sections: Vec<SectionView>,
    pub kinds: Vec<KindOption>,
}

#[instrument(skip(ctx))]
pub async fn builder(ctx: Ctx) -> Result<Response, AppError> {
    let id = PageId::from(ctx.param("pageId")?);
    let page = ctx.api.get_page(&id).await?;
    let len = page.sections.len();

    Ok(BuilderTemplate {
        chrome: Chrome::new(&ctx, &format!("Edit {}", page.title)),
        id: page.id.to_string(),
        sections: page
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| SectionView::new(index, len, section))
            .collect(),
        title: page.title,
        slug: page.slug,
        published: page.published,
        kinds: SectionKind::ALL
            .into_iter()
            .map(|kind| KindOption {
                value: kind.as_str(),
                label: kind.label(),
            })
            .collect(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn builder_action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let raw_id = ctx.param("pageId")?.to_string();
    let back = builder_path(&raw_id);
    let outcome = edit_page(&ctx, &PageId::from(raw_id.as_str()), &form).await;
    ctx.finish(&back, outcome)
}

async fn edit_page(ctx: &Ctx, id: &PageId, form: &UploadedForm) -> Result<String, AppError> {
    let mut page = ctx.api.get_page(id).await?;
    let message = apply_edit(&mut page, form)?;
    ctx.api.save_page(&page).await?;
    ctx.publish(|tenant| StoreEvent::PagesUpdated { tenant }).await;
    Ok(message)
}

/// Apply one builder edit to a page.
fn apply_edit(page: &mut Page, form: &UploadedForm) -> Result<String, AppError> {
    let bad = |e: nepostore_core::models::PageEditError| AppError::BadRequest(e.to_string());
    match form.text("action") {
        Some("add") => {
            let kind: SectionKind = required(form, "kind")?
                .parse()
                .map_err(AppError::BadRequest)?;
            page.add_section(kind);
            Ok(format!("{} added", kind.label()))
        }
        Some("move") => {
            let direction = match required(form, "direction")? {
                "up" => MoveDirection::Up,
                "down" => MoveDirection::Down,
                other => return Err(AppError::BadRequest(format!("Unknown direction {other}"))),
            };
            page.move_section(index(form)?, direction).map_err(bad)?;
            Ok("Section moved".to_string())
        }
        Some("remove") => {
            let removed = page.remove_section(index(form)?).map_err(bad)?;
            Ok(format!("{} removed", removed.kind().label()))
        }
        Some("save_section") => {
            let index = index(form)?;
            let kind = page
                .sections
                .get(index)
                .map(PageSection::kind)
                .ok_or_else(|| AppError::BadRequest(format!("Section {index} does not exist")))?;
            page.replace_section(index, section_from_form(kind, form)?)
                .map_err(bad)?;
            Ok("Section saved".to_string())
        }
        Some("publish") => {
            page.published = !page.published;
            Ok(if page.published {
                "Page published".to_string()
            } else {
                "Page unpublished".to_string()
            })
        }
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    }
}

fn index(form: &UploadedForm) -> Result<usize, AppError> {
    required(form, "index")?
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid section index".to_string()))
}

/// Build a section of `kind` from its edit form.
fn section_from_form(kind: SectionKind, form: &UploadedForm) -> Result<PageSection, AppError> {
    let text = |name: &str| form.text(name).map(String::from);
    Ok(match kind {
        SectionKind::Hero => PageSection::Hero {
            heading: required(form, "heading")?.to_string(),
            subheading: text("subheading"),
            image: text("image"),
            cta_label: text("cta_label"),
            cta_url: text("cta_url"),
        },
        SectionKind::Text => PageSection::Text {
            heading: text("heading"),
            body: required(form, "body")?.to_string(),
        },
        SectionKind::ProductGrid => PageSection::ProductGrid {
            heading: text("heading"),
            section: text("section"),
            limit: form
                .text("limit")
                .map(str::parse::<usize>)
                .transpose()
                .map_err(|_| AppError::BadRequest("Limit must be a whole number".to_string()))?
                .unwrap_or(8)
                .clamp(1, 48),
        },
        SectionKind::Image => PageSection::Image {
            url: required(form, "url")?.to_string(),
            alt: text("alt"),
            link: text("link"),
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page {
            id: PageId::from("pg1"),
            title: "About".into(),
            slug: "about".into(),
            sections: vec![
                SectionKind::Hero.placeholder(),
                SectionKind::Text.placeholder(),
            ],
            published: false,
        }
    }

    #[test]
    fn test_add_and_move() {
        let mut page = page();
        apply_edit(&mut page, &UploadedForm::from_urlencoded(b"action=add&kind=image")).unwrap();
        assert_eq!(page.sections[2].kind(), SectionKind::Image);

        apply_edit(
            &mut page,
            &UploadedForm::from_urlencoded(b"action=move&index=2&direction=up"),
        )
        .unwrap();
        assert_eq!(page.sections[1].kind(), SectionKind::Image);

        let err = apply_edit(
            &mut page,
            &UploadedForm::from_urlencoded(b"action=move&index=0&direction=up"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_save_section_keeps_kind() {
        let mut page = page();
        let form = UploadedForm::from_urlencoded(
            b"action=save_section&index=1&heading=Our+story&body=Since+1990",
        );
        apply_edit(&mut page, &form).unwrap();
        assert_eq!(
            page.sections[1],
            PageSection::Text {
                heading: Some("Our story".into()),
                body: "Since 1990".into(),
            }
        );

        let form = UploadedForm::from_urlencoded(b"action=save_section&index=9&body=x");
        assert!(apply_edit(&mut page, &form).is_err());
    }

    #[test]
    fn test_remove_and_publish() {
        let mut page = page();
        let message =
            apply_edit(&mut page, &UploadedForm::from_urlencoded(b"action=remove&index=0")).unwrap();
        assert_eq!(message, "Hero banner removed");
        assert_eq!(page.sections.len(), 1);

        apply_edit(&mut page, &UploadedForm::from_urlencoded(b"action=publish")).unwrap();
        assert!(page.published);
    }

    #[test]
    fn test_section_view_flags() {
        let page = page();
        let views: Vec<_> = page
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| SectionView::new(i, page.sections.len(), s))
            .collect();
        assert!(views[0].is_first && !views[0].is_last);
        assert!(views[1].is_last);
        assert_eq!(views[0].kind, "hero");
        assert_eq!(views[0].cta_label, "Shop now");
    }

    #[test]
    fn test_grid_limit_clamped() {
        let form = UploadedForm::from_urlencoded(b"limit=500");
        let section = section_from_form(SectionKind::ProductGrid, &form).unwrap();
        assert!(matches!(section, PageSection::ProductGrid { limit: 48, .. }));
    }
}
