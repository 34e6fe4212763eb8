/// Detail panel for the selected record
use iced::widget::{column, container, text};
use iced::{Element, Length};
use iced_aw::Wrap;

use super::controls;
use crate::state::controller::PageController;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    FieldChanged(&'static str, String),
}

pub fn view(controller: &PageController) -> Element<'_, DetailEvent> {
    let resource = controller.resource();

    let Some(record) = controller.selected() else {
        return container(text("선택된 항목이 없습니다").size(13))
            .padding(12)
            .width(Length::Fill)
            .into();
    };

    let fields = resource.columns.iter().map(|column| {
        let value = column.input_text(record.get(column.accessor));
        let on_input: Option<Box<dyn Fn(String) -> DetailEvent>> = if controller.can_edit(column) {
            let accessor = column.accessor;
            Some(Box::new(move |input: String| DetailEvent::FieldChanged(accessor, input)))
        } else {
            None
        };
        controls::field(column, &value, on_input)
    });

    let title = if record.is_new() {
        format!("{} (신규)", resource.title)
    } else {
        resource.title.to_string()
    };

    container(
        column![
            text(title).size(16),
            Wrap::with_elements(fields.collect()).spacing(12.0).line_spacing(8.0),
        ]
        .spacing(10),
    )
    .padding(12)
    .width(Length::Fill)
    .style(container::bordered_box)
    .into()
}
