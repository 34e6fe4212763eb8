/// Transient message strip shown above the active page
///
/// Every `show` bumps a generation counter and hands it back; the caller
/// schedules `expire(generation)` after the configured delay. Only the
/// timer of the notice currently on screen can clear it.
use iced::widget::{button, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Banner {
    current: Option<Notice>,
    generation: u64,
}

impl Banner {
    /// Replace whatever is shown. Returns the generation to expire later.
    pub fn show(&mut self, notice: Notice) -> u64 {
        tracing::debug!(tone = ?notice.tone, text = %notice.text, "notice shown");
        self.generation += 1;
        self.current = Some(notice);
        self.generation
    }

    /// Clear the notice if it is still the one from `generation`
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.current.is_none() {
            return false;
        }
        self.current = None;
        true
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn view<M: Clone + 'static>(&self, on_dismiss: M) -> Option<Element<'_, M>> {
        let notice = self.current()?;
        let tone = notice.tone;

        let strip = container(
            row![
                text(notice.text.as_str()).size(14),
                horizontal_space(),
                button(text("닫기").size(12))
                    .on_press(on_dismiss)
                    .style(button::text),
            ]
            .align_y(Alignment::Center),
        )
        .padding([6, 12])
        .width(Length::Fill)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            let pair = match tone {
                Tone::Info => palette.success.weak,
                Tone::Error => palette.danger.weak,
            };
            container::Style::default()
                .background(pair.color)
                .color(pair.text)
        });

        Some(strip.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires_with_its_own_timer() {
        let mut banner = Banner::default();
        let generation = banner.show(Notice::info("저장되었습니다"));

        assert!(banner.expire(generation));
        assert!(banner.current().is_none());
        assert!(!banner.expire(generation));
    }

    #[test]
    fn test_older_timer_does_not_clear_newer_notice() {
        let mut banner = Banner::default();
        let first = banner.show(Notice::info("저장되었습니다"));
        let second = banner.show(Notice::error("삭제 실패"));

        assert!(!banner.expire(first));
        assert_eq!(banner.current(), Some(&Notice::error("삭제 실패")));

        assert!(banner.expire(second));
        assert!(banner.current().is_none());
    }
}
