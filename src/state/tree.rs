/// Grouping of flat rows into a two-level tree (BOM per vessel)
///
/// The server returns flat rows; groups are derived here at load time.
/// Groups keep the order in which their key first appears, children keep
/// their original order, and every row lands in exactly one group.
use super::data::Record;

#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    /// Grouping value as text; rows without it share the empty key
    pub key: String,
    pub rows: Vec<&'a Record>,
}

/// One visual line of a flattened tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeLine<'g, 'a> {
    Group { key: &'g str, count: usize },
    Leaf(&'a Record),
}

pub fn group_rows<'a>(rows: &'a [Record], field: &str) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();

    for record in rows {
        let key = match record.get(field) {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.rows.push(record),
            None => groups.push(Group {
                key,
                rows: vec![record],
            }),
        }
    }

    groups
}

/// Group header followed by its children, group after group
pub fn flatten<'g, 'a>(groups: &'g [Group<'a>]) -> Vec<TreeLine<'g, 'a>> {
    groups
        .iter()
        .flat_map(|group| {
            std::iter::once(TreeLine::Group {
                key: group.key.as_str(),
                count: group.rows.len(),
            })
            .chain(group.rows.iter().map(|r| TreeLine::Leaf(*r)))
        })
        .collect()
}
