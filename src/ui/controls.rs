/// Input and button primitives shared by search bars and detail panels.
/// None of them hold state; values come in, messages go out.
use iced::widget::{button, column, pick_list, text, text_input, Button};
use iced::{Element, Length};

use crate::state::data::{is_valid_date, Column, ColumnKind};

const FIELD_WIDTH: f32 = 180.0;
const LABEL_SIZE: u16 = 12;

/// Labeled text box. Without `on_input` it is shown disabled.
pub fn text_box<'a, M: Clone + 'a>(
    label: &'a str,
    value: &str,
    on_input: Option<Box<dyn Fn(String) -> M + 'a>>,
) -> Element<'a, M> {
    let input = text_input(label, value)
        .on_input_maybe(on_input)
        .padding(6)
        .width(Length::Fixed(FIELD_WIDTH));

    column![text(label).size(LABEL_SIZE), input].spacing(4).into()
}

/// Text box for `YYYY-MM-DD` that flags text which is not a date
pub fn date_box<'a, M: Clone + 'a>(
    label: &'a str,
    value: &str,
    on_input: Option<Box<dyn Fn(String) -> M + 'a>>,
) -> Element<'a, M> {
    let input = text_input("YYYY-MM-DD", value)
        .on_input_maybe(on_input)
        .padding(6)
        .width(Length::Fixed(FIELD_WIDTH));

    let mut field = column![text(label).size(LABEL_SIZE), input].spacing(4);
    if !value.trim().is_empty() && !is_valid_date(value) {
        field = field.push(text("날짜 형식이 아닙니다").size(LABEL_SIZE).style(text::danger));
    }
    field.into()
}

/// Labeled dropdown over a fixed set of codes
pub fn dropdown<'a, M: Clone + 'a>(
    label: &'a str,
    options: &'static [&'static str],
    value: &str,
    on_select: Option<Box<dyn Fn(String) -> M + 'a>>,
) -> Element<'a, M> {
    let selected = options.iter().copied().find(|option| *option == value);

    let picker: Element<'a, M> = match on_select {
        Some(on_select) => pick_list(options, selected, move |option: &'static str| on_select(option.to_string()))
            .padding(6)
            .width(Length::Fixed(FIELD_WIDTH))
            .into(),
        // pick_list has no disabled state
        None => text_input(label, value)
            .padding(6)
            .width(Length::Fixed(FIELD_WIDTH))
            .into(),
    };

    column![text(label).size(LABEL_SIZE), picker].spacing(4).into()
}

/// The right primitive for a column
pub fn field<'a, M: Clone + 'a>(
    column: &'a Column,
    value: &str,
    on_input: Option<Box<dyn Fn(String) -> M + 'a>>,
) -> Element<'a, M> {
    match column.kind {
        ColumnKind::Text | ColumnKind::Number => text_box(column.header, value, on_input),
        ColumnKind::Date => date_box(column.header, value, on_input),
        ColumnKind::Select(options) => dropdown(column.header, options, value, on_input),
    }
}

/// "조회"
pub fn search_button<'a, M: Clone + 'a>(on_press: Option<M>) -> Button<'a, M> {
    button(text("조회")).on_press_maybe(on_press).padding(8).style(button::primary)
}

/// "추가"
pub fn insert_button<'a, M: Clone + 'a>(on_press: Option<M>) -> Button<'a, M> {
    button(text("추가")).on_press_maybe(on_press).padding(8).style(button::secondary)
}

/// "저장" / "수정" / "수정 완료"
pub fn save_button<'a, M: Clone + 'a>(label: &'a str, on_press: Option<M>) -> Button<'a, M> {
    button(text(label)).on_press_maybe(on_press).padding(8).style(button::success)
}

/// "삭제" and other destructive actions
pub fn danger_button<'a, M: Clone + 'a>(label: &'a str, on_press: Option<M>) -> Button<'a, M> {
    button(text(label)).on_press_maybe(on_press).padding(8).style(button::danger)
}
