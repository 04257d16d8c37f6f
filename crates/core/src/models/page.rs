//! Custom shop pages and the section list edited by the page builder.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::slugify;
use super::validation::{ValidationError, max_len, require};
use crate::types::PageId;

/// Slugs already taken by fixed shop routes.
pub const RESERVED_SLUGS: &[&str] = &["product", "category", "checkout", "wishlist", "static"];

fn default_grid_limit() -> usize {
    8
}

/// One block of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PageSection {
    Hero {
        heading: String,
        #[serde(default)]
        subheading: Option<String>,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        cta_label: Option<String>,
        #[serde(default)]
        cta_url: Option<String>,
    },
    Text {
        #[serde(default)]
        heading: Option<String>,
        body: String,
    },
    ProductGrid {
        #[serde(default)]
        heading: Option<String>,
        /// Restrict to a product section; all products when unset.
        #[serde(default)]
        section: Option<String>,
        #[serde(default = "default_grid_limit")]
        limit: usize,
    },
    Image {
        url: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        link: Option<String>,
    },
}

impl PageSection {
    #[must_use]
    pub const fn kind(&self) -> SectionKind {
        match self {
            Self::Hero { .. } => SectionKind::Hero,
            Self::Text { .. } => SectionKind::Text,
            Self::ProductGrid { .. } => SectionKind::ProductGrid,
            Self::Image { .. } => SectionKind::Image,
        }
    }
}

/// Section types offered by the "add section" menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Hero,
    Text,
    ProductGrid,
    Image,
}

impl SectionKind {
    pub const ALL: [Self; 4] = [Self::Hero, Self::Text, Self::ProductGrid, Self::Image];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Text => "text",
            Self::ProductGrid => "product_grid",
            Self::Image => "image",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Hero => "Hero banner",
            Self::Text => "Text block",
            Self::ProductGrid => "Product grid",
            Self::Image => "Image",
        }
    }

    /// A placeholder section of this kind for the builder to edit.
    #[must_use]
    pub fn placeholder(self) -> PageSection {
        match self {
            Self::Hero => PageSection::Hero {
                heading: "Welcome to our store".to_string(),
                subheading: None,
                image: None,
                cta_label: Some("Shop now".to_string()),
                cta_url: Some("/".to_string()),
            },
            Self::Text => PageSection::Text {
                heading: None,
                body: "Tell your customers something.".to_string(),
            },
            Self::ProductGrid => PageSection::ProductGrid {
                heading: Some("Featured".to_string()),
                section: None,
                limit: default_grid_limit(),
            },
            Self::Image => PageSection::Image {
                url: String::new(),
                alt: None,
                link: None,
            },
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("invalid section kind: {s}"))
    }
}

/// Direction for reordering a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// A builder edit that does not apply to the current section list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageEditError {
    #[error("section {index} does not exist (page has {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("section {index} cannot move {direction:?}")]
    AtEdge {
        index: usize,
        direction: MoveDirection,
    },
}

/// A custom page from `/api/templates/pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id", alias = "id")]
    pub id: PageId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub sections: Vec<PageSection>,
    #[serde(default)]
    pub published: bool,
}

impl Page {
    /// Append a placeholder section.
    pub fn add_section(&mut self, kind: SectionKind) {
        self.sections.push(kind.placeholder());
    }

    /// Swap a section with its neighbour.
    ///
    /// # Errors
    ///
    /// Fails when `index` is out of range or already at that edge.
    pub fn move_section(
        &mut self,
        index: usize,
        direction: MoveDirection,
    ) -> Result<(), PageEditError> {
        let len = self.sections.len();
        if index >= len {
            return Err(PageEditError::OutOfRange { index, len });
        }
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|t| *t < len),
        }
        .ok_or(PageEditError::AtEdge { index, direction })?;
        self.sections.swap(index, target);
        Ok(())
    }

    /// Remove and return a section.
    ///
    /// # Errors
    ///
    /// Fails when `index` is out of range.
    pub fn remove_section(&mut self, index: usize) -> Result<PageSection, PageEditError> {
        let len = self.sections.len();
        if index >= len {
            return Err(PageEditError::OutOfRange { index, len });
        }
        Ok(self.sections.remove(index))
    }

    /// Replace a section in place.
    ///
    /// # Errors
    ///
    /// Fails when `index` is out of range.
    pub fn replace_section(
        &mut self,
        index: usize,
        section: PageSection,
    ) -> Result<(), PageEditError> {
        let len = self.sections.len();
        let slot = self
            .sections
            .get_mut(index)
            .ok_or(PageEditError::OutOfRange { index, len })?;
        *slot = section;
        Ok(())
    }
}

/// New-page form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInput {
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

impl PageInput {
    /// The slug to store: the given one, or one derived from the title.
    #[must_use]
    pub fn effective_slug(&self) -> String {
        let slug = slugify(&self.slug);
        if slug.is_empty() {
            slugify(&self.title)
        } else {
            slug
        }
    }

    /// # Errors
    ///
    /// Rejects blank titles and slugs that collide with fixed shop routes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Title", &self.title)?;
        max_len("Title", &self.title, 120)?;
        let slug = self.effective_slug();
        if slug.is_empty() {
            return Err(ValidationError::Required("Slug"));
        }
        if RESERVED_SLUGS.contains(&slug.as_str()) {
            return Err(ValidationError::invalid("Slug", format!("'{slug}' is reserved")));
        }
        Ok(())
    }
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
            published: true,
        }
    }

    #[test]
    fn test_section_json_shape() {
        let json = serde_json::to_value(SectionKind::ProductGrid.placeholder()).unwrap();
        assert_eq!(json["type"], "product_grid");
        assert_eq!(json["limit"], 8);

        let hero: PageSection = serde_json::from_str(
            r#"{"type":"hero","heading":"Hi","ctaLabel":"Go","ctaUrl":"/sale"}"#,
        )
        .unwrap();
        assert_eq!(hero.kind(), SectionKind::Hero);
    }

    #[test]
    fn test_add_and_move() {
        let mut p = page();
        p.add_section(SectionKind::Image);
        assert_eq!(p.sections.len(), 3);

        p.move_section(2, MoveDirection::Up).unwrap();
        assert_eq!(p.sections[1].kind(), SectionKind::Image);

        assert_eq!(
            p.move_section(0, MoveDirection::Up),
            Err(PageEditError::AtEdge {
                index: 0,
                direction: MoveDirection::Up
            })
        );
        assert_eq!(
            p.move_section(2, MoveDirection::Down),
            Err(PageEditError::AtEdge {
                index: 2,
                direction: MoveDirection::Down
            })
        );
        assert_eq!(
            p.move_section(9, MoveDirection::Down),
            Err(PageEditError::OutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_remove() {
        let mut p = page();
        let removed = p.remove_section(0).unwrap();
        assert_eq!(removed.kind(), SectionKind::Hero);
        assert_eq!(p.sections.len(), 1);
        assert!(p.remove_section(5).is_err());
    }

    #[test]
    fn test_page_input() {
        let input = PageInput {
            title: "Our Story".into(),
            slug: String::new(),
        };
        assert_eq!(input.effective_slug(), "our-story");
        assert!(input.validate().is_ok());

        let reserved = PageInput {
            title: "Checkout".into(),
            slug: String::new(),
        };
        assert!(reserved.validate().is_err());
    }
}
