/// List grid
///
/// Renders a resource's columns against its rows. Flat or tree-shaped
/// (when the resource has a grouping field), read-only or with every
/// editable cell as a text input. The grid keeps no state of its own.
use iced::widget::{button, container, horizontal_rule, mouse_area, row, scrollable, text, text_input, Column, Row, Space};
use iced::{Element, Length, Theme};

use crate::state::data::{Column as GridColumn, Identity, Record};
use crate::state::resource::{GridMode, Resource};
use crate::state::tree;

/// Shown as the single row of an empty grid
pub const NO_DATA: &str = "조회된 데이터가 없습니다";

/// Indent of a child row under its group, in pixels
const INDENT: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    RowClicked(Identity),
    /// Every keystroke in an inline cell; no debouncing
    CellChanged(Identity, &'static str, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridLine<'a> {
    Group { label: String, count: usize },
    Row {
        record: &'a Record,
        depth: u16,
        /// One display string per column, in column order
        cells: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridBody<'a> {
    /// One "no data" row spanning `span` columns
    Placeholder { span: usize },
    Lines(Vec<GridLine<'a>>),
}

/// Work out what the grid shows, independent of any widget
pub fn layout<'a>(columns: &[GridColumn], rows: &'a [Record], tree_group: Option<&str>) -> GridBody<'a> {
    if rows.is_empty() {
        return GridBody::Placeholder {
            span: columns.len(),
        };
    }

    let cells = |record: &Record| -> Vec<String> { columns.iter().map(|c| record.display(c)).collect() };

    let lines = match tree_group {
        None => rows
            .iter()
            .map(|record| GridLine::Row {
                record,
                depth: 0,
                cells: cells(record),
            })
            .collect(),
        Some(field) => {
            let groups = tree::group_rows(rows, field);
            tree::flatten(&groups)
                .into_iter()
                .map(|line| match line {
                    tree::TreeLine::Group { key, count } => GridLine::Group {
                        label: key.to_string(),
                        count,
                    },
                    tree::TreeLine::Leaf(record) => GridLine::Row {
                        record,
                        depth: 1,
                        cells: cells(record),
                    },
                })
                .collect()
        }
    };

    GridBody::Lines(lines)
}

pub fn view<'a>(resource: &'a Resource, rows: &'a [Record], selected: Option<Identity>) -> Element<'a, GridEvent> {
    let editable = resource.grid == GridMode::Editable;
    let columns = &resource.columns;

    let mut header = Row::new();
    if editable {
        header = header.push(Space::with_width(Length::Fixed(28.0)));
    }
    for column in columns {
        header = header.push(
            container(text(column.header).size(13))
                .width(Length::FillPortion(1))
                .padding(6),
        );
    }

    let body: Element<'a, GridEvent> = match layout(columns, rows, resource.tree_group) {
        GridBody::Placeholder { .. } => container(text(NO_DATA).size(13))
            .padding(12)
            .center_x(Length::Fill)
            .into(),
        GridBody::Lines(lines) => {
            let lines = lines.into_iter().map(|line| match line {
                GridLine::Group { label, count } => group_line(label, count),
                GridLine::Row { record, depth, cells } => {
                    let is_selected = selected.as_ref().is_some_and(|id| record.matches(id));
                    record_line(resource, record, depth, cells, is_selected, editable)
                }
            });
            scrollable(Column::with_children(lines).spacing(1))
                .height(Length::Fill)
                .into()
        }
    };

    Column::new()
        .push(header)
        .push(horizontal_rule(1))
        .push(body)
        .height(Length::Fill)
        .into()
}

fn group_line<'a>(label: String, count: usize) -> Element<'a, GridEvent> {
    let label = if label.is_empty() {
        "(미지정)".to_string()
    } else {
        label
    };

    container(text(format!("▾ {label} ({count})")).size(13))
        .padding(6)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn record_line<'a>(
    resource: &'a Resource,
    record: &'a Record,
    depth: u16,
    cells: Vec<String>,
    is_selected: bool,
    editable: bool,
) -> Element<'a, GridEvent> {
    let identity = record.identity();
    let mut line = Row::new();

    if editable {
        let marker = if is_selected { "▶" } else { "·" };
        line = line.push(
            button(text(marker).size(13))
                .on_press(GridEvent::RowClicked(identity.clone()))
                .style(button::text)
                .width(Length::Fixed(28.0)),
        );
    }

    for (index, (column, cell)) in resource.columns.iter().zip(cells).enumerate() {
        let mut content: Element<'a, GridEvent> = if editable && resource.can_edit(record, column) {
            let id = identity.clone();
            let accessor = column.accessor;
            text_input("", &column.input_text(record.get(accessor)))
                .on_input(move |value| GridEvent::CellChanged(id.clone(), accessor, value))
                .size(13)
                .into()
        } else {
            text(cell).size(13).into()
        };

        if index == 0 && depth > 0 {
            content = row![Space::with_width(Length::Fixed(INDENT * f32::from(depth))), content].into();
        }

        line = line.push(container(content).width(Length::FillPortion(1)).padding(4));
    }

    let line = container(line).width(Length::Fill).style(move |theme: &Theme| {
        if is_selected {
            container::rounded_box(theme)
        } else {
            container::transparent(theme)
        }
    });

    if editable {
        line.into()
    } else {
        mouse_area(line)
            .on_press(GridEvent::RowClicked(identity))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Fields;
    use serde_json::json;

    fn columns() -> Vec<GridColumn> {
        vec![
            GridColumn::number("자재코드", "materialId"),
            GridColumn::text("자재명", "materialNm"),
            GridColumn::text("규격", "spec"),
        ]
    }

    fn records(data: serde_json::Value, key: &str) -> Vec<Record> {
        data.as_array()
            .unwrap()
            .iter()
            .map(|v| {
                let fields: Fields = v.as_object().cloned().unwrap();
                Record::persisted(fields, key).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_rows_render_one_placeholder_across_all_columns() {
        let body = layout(&columns(), &[], None);
        assert_eq!(body, GridBody::Placeholder { span: 3 });

        let body = layout(&columns(), &[], Some("vesselId"));
        assert_eq!(body, GridBody::Placeholder { span: 3 });
    }

    #[test]
    fn test_one_material_renders_one_row() {
        let rows = records(json!([{"materialId": 1, "materialNm": "Steel"}]), "materialId");
        let columns = columns();

        let GridBody::Lines(lines) = layout(&columns, &rows, None) else {
            panic!("expected rows, got placeholder");
        };

        assert_eq!(lines.len(), 1);
        let GridLine::Row { cells, depth, .. } = &lines[0] else {
            panic!("expected a record line");
        };
        let name_index = columns.iter().position(|c| c.header == "자재명").unwrap();
        assert_eq!(cells[name_index], "Steel");
        // 규격 is absent from the row: empty cell, no error
        assert_eq!(cells, &vec!["1".to_string(), "Steel".to_string(), String::new()]);
        assert_eq!(*depth, 0);
    }

    #[test]
    fn test_tree_mode_indents_children_under_groups() {
        let rows = records(
            json!([
                {"bomId": 1, "vesselId": "H-1", "materialNm": "Plate"},
                {"bomId": 2, "vesselId": "H-2", "materialNm": "Pipe"},
                {"bomId": 3, "vesselId": "H-1", "materialNm": "Valve"},
            ]),
            "bomId",
        );
        let columns = vec![GridColumn::text("자재명", "materialNm")];

        let GridBody::Lines(lines) = layout(&columns, &rows, Some("vesselId")) else {
            panic!("expected rows");
        };

        let shape: Vec<String> = lines
            .iter()
            .map(|line| match line {
                GridLine::Group { label, count } => format!("{label}:{count}"),
                GridLine::Row { cells, depth, .. } => format!("{depth}-{}", cells[0]),
            })
            .collect();
        assert_eq!(shape, vec!["H-1:2", "1-Plate", "1-Valve", "H-2:1", "1-Pipe"]);
    }
}
