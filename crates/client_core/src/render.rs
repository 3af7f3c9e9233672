//! Templates and the rendered form of the action list.

use crate::item::ItemKey;

/// Ordered `name -> value` pairs handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(Vec<(String, String)>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value when `name` is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`FieldMap::get`], with missing names reading as empty.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// The three externally supplied templates. Each is a pure function of its
/// field map.
pub trait Templates {
    fn view(&self, fields: &FieldMap) -> String;
    fn edit(&self, fields: &FieldMap) -> String;
    /// Receives a single `msg` entry with one `field: message` line per error.
    fn error(&self, fields: &FieldMap) -> String;
}

const DETAIL_FIELDS: [&str; 6] = [
    "hook_success",
    "hook_failure",
    "hook_finished",
    "output_UX",
    "output_CX",
    "output_CH",
];

/// Plain-text templates used by the command-line front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTemplates;

impl Templates for PlainTemplates {
    fn view(&self, fields: &FieldMap) -> String {
        let mut out = format!(
            "[#{}] {}  {}@{}\n    $ {}\n",
            fields.value("id"),
            fields.value("name"),
            fields.value("username"),
            fields.value("host"),
            fields.value("command"),
        );
        for name in DETAIL_FIELDS {
            let detail = fields.value(name);
            if !detail.is_empty() {
                out.push_str(&format!("    {name}: {detail}\n"));
            }
        }
        out
    }

    fn edit(&self, fields: &FieldMap) -> String {
        let mut out = format!("[#{}] editing\n", fields.value("id"));
        for (name, value) in fields.iter() {
            if matches!(
                name,
                "id" | "submit_label" | "messages" | "authorized_keys_entry"
            ) {
                continue;
            }
            out.push_str(&format!("    {name} = {value:?}\n"));
        }
        out.push_str(&format!(
            "    [{}] [Cancel]\n",
            fields.get("submit_label").unwrap_or("Save")
        ));
        out.push_str(fields.value("messages"));
        out
    }

    fn error(&self, fields: &FieldMap) -> String {
        let mut out = String::from("    errors:\n");
        for line in fields.value("msg").lines() {
            out.push_str(&format!("      - {line}\n"));
        }
        out
    }
}

/// Output of the last full render, one block per controller in visual order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedList {
    blocks: Vec<(ItemKey, String)>,
}

impl RenderedList {
    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
    }

    pub(crate) fn push(&mut self, key: ItemKey, markup: String) {
        self.blocks.push((key, markup));
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn keys(&self) -> Vec<ItemKey> {
        self.blocks.iter().map(|(key, _)| *key).collect()
    }

    pub fn block(&self, key: ItemKey) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, markup)| markup.as_str())
    }

    pub fn markup(&self) -> String {
        self.blocks
            .iter()
            .map(|(_, markup)| markup.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_map_keeps_insertion_order_and_overwrites() {
        let mut map = FieldMap::new();
        map.insert("name", "deploy");
        map.insert("host", "web1");
        map.insert("name", "build");

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("name", "build"), ("host", "web1")]);
    }

    #[test]
    fn plain_view_lists_only_filled_details() {
        let mut map = FieldMap::new();
        map.insert("id", "3");
        map.insert("name", "deploy");
        map.insert("username", "ops");
        map.insert("host", "web1");
        map.insert("command", "./deploy.sh");
        map.insert("output_UX", "/tmp/ux.xml");
        map.insert("hook_failure", "");

        let markup = PlainTemplates.view(&map);
        assert!(markup.starts_with("[#3] deploy  ops@web1\n"));
        assert!(markup.contains("output_UX: /tmp/ux.xml"));
        assert!(!markup.contains("hook_failure"));
    }

    #[test]
    fn plain_error_renders_one_line_per_message() {
        let mut map = FieldMap::new();
        map.insert("msg", "host: required\nname: too long");

        assert_eq!(
            PlainTemplates.error(&map),
            "    errors:\n      - host: required\n      - name: too long\n"
        );
    }
}
