//! Whiteboard document and component value types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub type ComponentId = String;

/// Free-form component properties. The sync core never interprets them.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// One item on the whiteboard.
///
/// On the wire a component is a flat JSON object carrying its own `id`
/// next to its properties. The document key is what identifies it; a
/// numeric `id` is read as its decimal form and a null one is left empty
/// for [`Document::fill_missing_ids`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: ComponentId,
    #[serde(flatten)]
    pub properties: Properties,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<ComponentId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => ComponentId::new(),
    })
}

impl Component {
    /// Build a component; any `id` key in `properties` is ignored.
    pub fn with_id(id: impl Into<ComponentId>, mut properties: Properties) -> Self {
        properties.remove("id");
        Self {
            id: id.into(),
            properties,
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Shallow merge: top-level keys in `patch` replace existing ones.
    /// The component id cannot be patched.
    pub fn merge(&mut self, patch: &Properties) {
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            self.properties.insert(key.clone(), value.clone());
        }
    }
}

/// The complete set of components in a room, keyed by component id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    components: BTreeMap<ComponentId, Component>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Insert under the component's own id, returning the replaced entry.
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        self.components.insert(component.id.clone(), component)
    }

    pub fn remove(&mut self, id: &str) -> Option<Component> {
        self.components.remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Give components that arrived without an `id` field the id of their key.
    pub fn fill_missing_ids(&mut self) {
        for (key, component) in self.components.iter_mut() {
            if component.id.is_empty() {
                component.id = key.clone();
            }
        }
    }
}

impl FromIterator<Component> for Document {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }
}
