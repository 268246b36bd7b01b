//! Visual templates a biodata can be rendered with.
//!
//! The catalogue is fixed. Rendering and purchase flows belong to the host.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub is_paid: bool,
    /// Price in whole rupees; `None` for free templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub icon: &'static str,
}

pub static TEMPLATES: [Template; 3] = [
    Template {
        id: "template1",
        name: "Classic",
        is_paid: false,
        price: None,
        background_color: "#FFFFFF",
        border_color: "#000000",
        icon: "document-text",
    },
    Template {
        id: "template2",
        name: "Floral",
        is_paid: true,
        price: Some(99),
        background_color: "#F8F4FF",
        border_color: "#9C6ADE",
        icon: "flower",
    },
    Template {
        id: "template3",
        name: "Modern",
        is_paid: true,
        price: Some(149),
        background_color: "#F0F9FF",
        border_color: "#0091FF",
        icon: "trending-up",
    },
];

/// The template selected when a preview is first opened.
pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_free_classic_template() {
        let template = default_template();
        assert_eq!(template.name, "Classic");
        assert!(!template.is_paid);
        assert_eq!(template.price, None);
    }

    #[test]
    fn paid_templates_carry_a_price() {
        for template in TEMPLATES.iter() {
            assert_eq!(template.is_paid, template.price.is_some(), "{}", template.id);
        }
        assert_eq!(find_template("template3").map(|t| t.price), Some(Some(149)));
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(find_template("template9").is_none());
    }

    #[test]
    fn serializes_for_the_host() {
        let json = serde_json::to_value(find_template("template2").unwrap()).unwrap();
        assert_eq!(json["isPaid"], true);
        assert_eq!(json["price"], 99);
        assert_eq!(json["borderColor"], "#9C6ADE");
    }
}
