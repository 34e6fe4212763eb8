/// Application frame: sidebar, header bar and the login form
use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use crate::api::Credentials;
use crate::pages::{PageId, SECTIONS};
use crate::state::session::Session;

const SIDEBAR_WIDTH: f32 = 200.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Navigate(PageId),
    /// Index into `SECTIONS`
    ToggleSection(usize),
    Logout,
}

/// Which sidebar sections are open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    expanded: Vec<bool>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            expanded: vec![true; SECTIONS.len()],
        }
    }
}

impl Sidebar {
    pub fn toggle(&mut self, section: usize) {
        if let Some(open) = self.expanded.get_mut(section) {
            *open = !*open;
        }
    }

    pub fn is_expanded(&self, section: usize) -> bool {
        self.expanded.get(section).copied().unwrap_or(false)
    }

    pub fn view(&self, active: PageId) -> Element<'_, ShellEvent> {
        let mut list = Column::new().spacing(2).padding(8);

        for (index, section) in SECTIONS.iter().enumerate() {
            let open = self.is_expanded(index);
            let marker = if open { "▾" } else { "▸" };

            list = list.push(
                button(text(format!("{marker} {}", section.title)).size(14))
                    .on_press(ShellEvent::ToggleSection(index))
                    .style(button::text)
                    .width(Length::Fill),
            );

            if open {
                for &page in section.pages {
                    let style = if page == active {
                        button::primary
                    } else {
                        button::text
                    };
                    list = list.push(
                        button(text(page.title()).size(13))
                            .on_press(ShellEvent::Navigate(page))
                            .style(style)
                            .padding([4, 20])
                            .width(Length::Fill),
                    );
                }
            }
        }

        container(scrollable(list))
            .width(Length::Fixed(SIDEBAR_WIDTH))
            .height(Length::Fill)
            .style(container::bordered_box)
            .into()
    }
}

/// Page title on the left, signed-in user and logout on the right
pub fn header<'a>(title: &'a str, session: &'a Session) -> Element<'a, ShellEvent> {
    container(
        row![
            text(title).size(20),
            horizontal_space(),
            text(session.email.as_str()).size(13),
            button(text("로그아웃").size(13))
                .on_press(ShellEvent::Logout)
                .style(button::secondary),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding([8, 16])
    .width(Length::Fill)
    .into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    EmailChanged(String),
    PasswordChanged(String),
    Submit,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    email: String,
    password: String,
    submitting: bool,
    error: Option<String>,
}

impl LoginForm {
    /// Returns the credentials to send when the form is submitted
    pub fn update(&mut self, event: LoginEvent) -> Option<Credentials> {
        match event {
            LoginEvent::EmailChanged(email) => self.email = email,
            LoginEvent::PasswordChanged(password) => self.password = password,
            LoginEvent::Submit => {
                if !self.can_submit() {
                    return None;
                }
                self.submitting = true;
                self.error = None;
                return Some(Credentials {
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                });
            }
        }
        None
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.email.trim().is_empty() && !self.password.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Login went through; the password is not kept
    pub fn succeeded(&mut self) {
        self.password.clear();
        self.submitting = false;
        self.error = None;
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }

    pub fn view(&self) -> Element<'_, LoginEvent> {
        let submit = self.can_submit().then_some(LoginEvent::Submit);

        let mut form = column![
            text("Shipyard ERP").size(24),
            text_input("이메일", &self.email)
                .on_input(LoginEvent::EmailChanged)
                .padding(8),
            text_input("비밀번호", &self.password)
                .on_input(LoginEvent::PasswordChanged)
                .on_submit_maybe(submit.clone())
                .secure(true)
                .padding(8),
            button(text(if self.is_submitting() { "로그인 중..." } else { "로그인" }))
                .on_press_maybe(submit)
                .style(button::primary)
                .padding(8)
                .width(Length::Fill),
        ]
        .spacing(12)
        .width(Length::Fixed(320.0));

        if let Some(error) = self.error() {
            form = form.push(text(error).size(13).style(text::danger));
        }

        container(form).center(Length::Fill).into()
    }
}
