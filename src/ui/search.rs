/// Search bar with two explicit slots: inputs and actions.
///
/// Inputs wrap over as many lines as they need; actions sit in one row
/// to the right. What goes where is decided by the caller, not by
/// inspecting the widgets.
use iced::widget::{container, horizontal_space, row, Row};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

pub struct SearchBar<'a, M> {
    inputs: Vec<Element<'a, M>>,
    actions: Vec<Element<'a, M>>,
}

impl<'a, M: 'a> SearchBar<'a, M> {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Text box, date box, dropdown...
    pub fn input(mut self, input: impl Into<Element<'a, M>>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Search, insert, save...
    pub fn action(mut self, action: impl Into<Element<'a, M>>) -> Self {
        self.actions.push(action.into());
        self
    }

    #[cfg(test)]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    #[cfg(test)]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn view(self) -> Element<'a, M> {
        let inputs = Wrap::with_elements(self.inputs)
            .spacing(12.0)
            .line_spacing(8.0);
        let actions = Row::with_children(self.actions).spacing(8);

        container(
            row![inputs, horizontal_space(), actions]
                .spacing(16)
                .align_y(Alignment::End),
        )
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
    }
}

impl<'a, M: 'a> Default for SearchBar<'a, M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::widget::text;

    #[derive(Debug, Clone)]
    enum Msg {
        Search,
    }

    #[test]
    fn test_inputs_and_actions_stay_in_their_slots() {
        let bar: SearchBar<'_, Msg> = SearchBar::new()
            .input(text("자재명"))
            .action(iced::widget::button("조회").on_press(Msg::Search))
            .input(text("자재유형"));

        assert_eq!(bar.input_count(), 2);
        assert_eq!(bar.action_count(), 1);
    }
}
