//! Flat-file JSON store for the dashboard document.
//!
//! The whole dataset is one JSON document, loaded and rewritten in full on
//! every mutating request. Last write wins; there is no locking and no
//! partial-failure recovery.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A link shown inside a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A small status-display widget bound to an external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

/// A named group of links and widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// Absent in documents written before widgets existed; created lazily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<Widget>>,
}

/// Global dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Homeport".to_string(),
        }
    }
}

/// The whole persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub sections: Vec<Section>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Re-sort `items` to match an explicit id ordering.
///
/// Mirrors the UI contract: items are keyed by their position in `order`,
/// ids missing from the list sort to the front and keep their relative
/// order among themselves. Unknown ids in `order` are ignored.
pub fn apply_order<T>(items: &mut [T], order: &[String], id_of: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| {
        order
            .iter()
            .position(|id| id == id_of(item))
            .map(|i| i as i64)
            .unwrap_or(-1)
    });
}

impl DashboardData {
    /// Create a section with empty link and widget lists.
    pub fn add_section(&mut self, title: String, icon: Option<String>) -> Section {
        let section = Section {
            id: new_id(),
            title,
            icon,
            links: Vec::new(),
            widgets: Some(Vec::new()),
        };
        self.sections.push(section.clone());
        section
    }

    /// Update a section's title, and its icon when one is provided.
    /// Returns None if the section does not exist.
    pub fn update_section(
        &mut self,
        id: &str,
        title: String,
        icon: Option<String>,
    ) -> Option<Section> {
        let section = self.sections.iter_mut().find(|s| s.id == id)?;
        section.title = title;
        if let Some(icon) = icon {
            section.icon = Some(icon);
        }
        Some(section.clone())
    }

    /// Remove a section if present. Idempotent.
    pub fn remove_section(&mut self, id: &str) {
        self.sections.retain(|s| s.id != id);
    }

    pub fn reorder_sections(&mut self, order: &[String]) {
        apply_order(&mut self.sections, order, |s| &s.id);
    }

    /// Append a link to a section. Returns None if the section does not exist.
    pub fn add_link(
        &mut self,
        section_id: &str,
        label: String,
        url: String,
        icon: Option<String>,
    ) -> Option<Link> {
        let section = self.sections.iter_mut().find(|s| s.id == section_id)?;
        let link = Link {
            id: new_id(),
            label,
            url,
            icon,
        };
        section.links.push(link.clone());
        Some(link)
    }

    /// Merge-update the first link with this id across all sections.
    /// Only provided fields change. Returns None if no link matches.
    pub fn update_link(
        &mut self,
        id: &str,
        label: Option<String>,
        url: Option<String>,
        icon: Option<String>,
    ) -> Option<Link> {
        for section in &mut self.sections {
            if let Some(link) = section.links.iter_mut().find(|l| l.id == id) {
                if let Some(label) = label {
                    link.label = label;
                }
                if let Some(url) = url {
                    link.url = url;
                }
                if let Some(icon) = icon {
                    link.icon = Some(icon);
                }
                return Some(link.clone());
            }
        }
        None
    }

    /// Remove a link from every section. Idempotent.
    pub fn remove_link(&mut self, id: &str) {
        for section in &mut self.sections {
            section.links.retain(|l| l.id != id);
        }
    }

    /// Reorder one section's links. Returns false if the section is unknown.
    pub fn reorder_links(&mut self, section_id: &str, order: &[String]) -> bool {
        match self.sections.iter_mut().find(|s| s.id == section_id) {
            Some(section) => {
                apply_order(&mut section.links, order, |l| &l.id);
                true
            }
            None => false,
        }
    }

    /// Append a widget to a section, creating the widget list if absent.
    /// Returns None if the section does not exist.
    pub fn add_widget(
        &mut self,
        section_id: &str,
        name: String,
        props: Option<serde_json::Value>,
    ) -> Option<Widget> {
        let section = self.sections.iter_mut().find(|s| s.id == section_id)?;
        let widget = Widget {
            id: new_id(),
            name,
            props,
        };
        section
            .widgets
            .get_or_insert_with(Vec::new)
            .push(widget.clone());
        Some(widget)
    }

    /// Remove a widget from every section. Idempotent.
    pub fn remove_widget(&mut self, id: &str) {
        for section in &mut self.sections {
            if let Some(widgets) = section.widgets.as_mut() {
                widgets.retain(|w| w.id != id);
            }
        }
    }

    /// Reorder one section's widgets. Returns false if the section is unknown.
    pub fn reorder_widgets(&mut self, section_id: &str, order: &[String]) -> bool {
        match self.sections.iter_mut().find(|s| s.id == section_id) {
            Some(section) => {
                if let Some(widgets) = section.widgets.as_mut() {
                    apply_order(widgets, order, |w| &w.id);
                }
                true
            }
            None => false,
        }
    }

    pub fn link_count(&self) -> usize {
        self.sections.iter().map(|s| s.links.len()).sum()
    }

    pub fn widget_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.widgets.as_ref().map(Vec::len).unwrap_or(0))
            .sum()
    }
}

/// Handle on the JSON data file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    /// Seed the data file with a default document if it does not exist.
    pub fn init(&self) -> anyhow::Result<()> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.save(&DashboardData::default())?;
            tracing::info!("Seeded new data file at {:?}", self.path);
        }
        Ok(())
    }

    /// Read and parse the whole document.
    pub fn load(&self) -> anyhow::Result<DashboardData> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", self.path, e))?;
        let data = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid data file {:?}: {}", self.path, e))?;
        Ok(data)
    }

    /// Rewrite the whole document, pretty-printed.
    pub fn save(&self, data: &DashboardData) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with_section() -> (DashboardData, String) {
        let mut data = DashboardData::default();
        let section = data.add_section("Servers".to_string(), None);
        (data, section.id)
    }

    #[test]
    fn test_add_section_defaults() {
        let mut data = DashboardData::default();
        let section = data.add_section("Media".to_string(), Some("film".to_string()));
        assert_eq!(section.title, "Media");
        assert_eq!(section.icon.as_deref(), Some("film"));
        assert!(section.links.is_empty());
        assert_eq!(section.widgets.as_ref().map(Vec::len), Some(0));
        assert!(!section.id.is_empty());
        assert_eq!(data.sections.len(), 1);
    }

    #[test]
    fn test_update_section_preserves_icon_when_absent() {
        let mut data = DashboardData::default();
        let section = data.add_section("Media".to_string(), Some("film".to_string()));
        let updated = data
            .update_section(&section.id, "Movies".to_string(), None)
            .unwrap();
        assert_eq!(updated.title, "Movies");
        assert_eq!(updated.icon.as_deref(), Some("film"));
    }

    #[test]
    fn test_update_unknown_section() {
        let mut data = DashboardData::default();
        assert!(data.update_section("nope", "x".to_string(), None).is_none());
    }

    #[test]
    fn test_remove_section_is_idempotent() {
        let (mut data, id) = data_with_section();
        data.remove_section(&id);
        data.remove_section(&id);
        assert!(data.sections.is_empty());
    }

    #[test]
    fn test_link_crud_roundtrip() {
        let (mut data, sid) = data_with_section();
        let link = data
            .add_link(&sid, "Grafana".to_string(), "http://g".to_string(), None)
            .unwrap();

        let updated = data
            .update_link(&link.id, None, Some("http://grafana".to_string()), None)
            .unwrap();
        assert_eq!(updated.label, "Grafana");
        assert_eq!(updated.url, "http://grafana");

        data.remove_link(&link.id);
        assert_eq!(data.link_count(), 0);
    }

    #[test]
    fn test_add_link_to_unknown_section() {
        let mut data = DashboardData::default();
        assert!(data
            .add_link("nope", "a".to_string(), "b".to_string(), None)
            .is_none());
    }

    #[test]
    fn test_widget_list_created_lazily() {
        let (mut data, sid) = data_with_section();
        data.sections[0].widgets = None;
        let widget = data
            .add_widget(&sid, "ping".to_string(), Some(serde_json::json!({"url": "http://x"})))
            .unwrap();
        assert_eq!(data.widget_count(), 1);
        data.remove_widget(&widget.id);
        assert_eq!(data.widget_count(), 0);
    }

    #[test]
    fn test_reorder_sections_full_order() {
        let mut data = DashboardData::default();
        let a = data.add_section("A".to_string(), None).id;
        let b = data.add_section("B".to_string(), None).id;
        let c = data.add_section("C".to_string(), None).id;

        data.reorder_sections(&[c.clone(), a.clone(), b.clone()]);
        let titles: Vec<_> = data.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_missing_ids_sort_to_front() {
        let mut data = DashboardData::default();
        data.add_section("A".to_string(), None);
        data.add_section("B".to_string(), None);
        let c = data.add_section("C".to_string(), None).id;

        // A and B are not listed: they keep their relative order at the front.
        data.reorder_sections(&[c]);
        let titles: Vec<_> = data.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn test_reorder_ignores_unknown_ids() {
        let mut data = DashboardData::default();
        let a = data.add_section("A".to_string(), None).id;
        let b = data.add_section("B".to_string(), None).id;

        data.reorder_sections(&["ghost".to_string(), b, a]);
        let titles: Vec<_> = data.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn test_reorder_links_unknown_section() {
        let mut data = DashboardData::default();
        assert!(!data.reorder_links("nope", &[]));
    }

    #[test]
    fn test_store_roundtrip_and_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        store.init().unwrap();

        let mut data = store.load().unwrap();
        assert_eq!(data.settings.title, "Homeport");
        assert!(data.sections.is_empty());

        data.add_section("Servers".to_string(), None);
        data.settings.title = "Lab".to_string();
        store.save(&data).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.settings.title, "Lab");
        assert_eq!(reloaded.sections.len(), 1);
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let mut data = DashboardData::default();
        let sid = data.add_section("A".to_string(), None).id;
        data.sections[0].widgets = None;
        data.add_link(&sid, "x".to_string(), "http://x".to_string(), None);

        let json = serde_json::to_string(&data).unwrap();
        assert!(!json.contains("\"icon\""));
        assert!(!json.contains("\"widgets\""));
    }

    #[test]
    fn test_loads_document_without_widgets_field() {
        let json = r#"{
            "settings": { "title": "Lab" },
            "sections": [
                { "id": "s1", "title": "Old", "links": [] }
            ]
        }"#;
        let data: DashboardData = serde_json::from_str(json).unwrap();
        assert!(data.sections[0].widgets.is_none());
        assert_eq!(data.widget_count(), 0);
    }
}
