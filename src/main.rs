use iced::widget::{column, row, text};
use iced::{Element, Length, Task, Theme};
use std::collections::HashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod pages;
mod state;
mod ui;

use api::{ApiClient, LoginResponse};
use config::AppConfig;
use error::{ApiError, AppError};
use pages::{PageId, PageMessage, ResourcePage};
use state::session::{LoginOutcome, SessionStore};
use state::storage::Storage;
use ui::banner::{Banner, Notice};
use ui::shell::{self, LoginEvent, LoginForm, ShellEvent, Sidebar};

/// Main application state
struct ShipyardAdmin {
    config: AppConfig,
    /// Client without credentials; pages get a copy carrying the token
    api: ApiClient,
    session: SessionStore,
    login: LoginForm,
    sidebar: Sidebar,
    active: PageId,
    /// Every page keeps its rows and search inputs while another is shown
    pages: HashMap<PageId, ResourcePage>,
    banner: Banner,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    Login(LoginEvent),
    LoginFinished(Result<LoginResponse, ApiError>),
    Shell(ShellEvent),
    Page(PageId, PageMessage),
    /// Auto-dismiss timer of the banner notice with this generation
    BannerExpired(u64),
    DismissBanner,
}

impl ShipyardAdmin {
    fn new() -> (Self, Task<Message>) {
        // Without config and session storage there is nothing to show
        let (config, api, session) =
            boot().expect("Failed to start. Check the config file and the storage directory.");

        tracing::info!(api = %config.api_base_url, "shipyard admin started");

        let mut app = ShipyardAdmin {
            config,
            api,
            session,
            login: LoginForm::default(),
            sidebar: Sidebar::default(),
            active: PageId::Materials,
            pages: fresh_pages(),
            banner: Banner::default(),
        };
        let task = app.mount_active();

        (app, task)
    }

    /// Client carrying the session token, if logged in
    fn session_api(&self) -> Option<ApiClient> {
        self.session
            .current()
            .map(|session| self.api.with_token(session.token.as_str()))
    }

    fn mount_active(&mut self) -> Task<Message> {
        let Some(api) = self.session_api() else {
            return Task::none();
        };
        let id = self.active;

        match self.pages.get_mut(&id) {
            Some(page) => page.mount(&api).map(move |message| Message::Page(id, message)),
            None => Task::none(),
        }
    }

    fn notify(&mut self, notice: Notice) -> Task<Message> {
        let generation = self.banner.show(notice);
        let delay = self.config.banner_timeout();

        Task::perform(tokio::time::sleep(delay), move |_| Message::BannerExpired(generation))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Login(event) => {
                let Some(credentials) = self.login.update(event) else {
                    return Task::none();
                };
                let api = self.api.clone();
                Task::perform(
                    async move { api.login(&credentials).await },
                    Message::LoginFinished,
                )
            }
            Message::LoginFinished(result) => match self.session.finish_login(result) {
                Ok(LoginOutcome::Accepted(session)) => {
                    self.login.succeeded();
                    self.pages = fresh_pages();
                    let mount = self.mount_active();
                    let notice = self.notify(Notice::info(format!("{} 님, 환영합니다", session.email)));
                    Task::batch([mount, notice])
                }
                Ok(LoginOutcome::Rejected) => {
                    self.login.failed("이메일 또는 비밀번호가 올바르지 않습니다");
                    Task::none()
                }
                Err(err) => {
                    tracing::warn!(%err, "login failed");
                    self.login.failed(format!("로그인 실패: {err}"));
                    Task::none()
                }
            },
            Message::Shell(ShellEvent::Navigate(id)) => {
                self.active = id;
                self.mount_active()
            }
            Message::Shell(ShellEvent::ToggleSection(index)) => {
                self.sidebar.toggle(index);
                Task::none()
            }
            Message::Shell(ShellEvent::Logout) => match self.session.logout() {
                Ok(()) => {
                    self.pages = fresh_pages();
                    self.login = LoginForm::default();
                    self.banner.dismiss();
                    Task::none()
                }
                Err(err) => {
                    tracing::warn!(%err, "logout failed");
                    self.notify(Notice::error(format!("로그아웃 실패: {err}")))
                }
            },
            Message::Page(id, message) => {
                let Some(api) = self.session_api() else {
                    return Task::none();
                };
                let Some(page) = self.pages.get_mut(&id) else {
                    return Task::none();
                };

                let (task, notice) = page.update(message, &api);
                let task = task.map(move |message| Message::Page(id, message));
                match notice {
                    Some(notice) => Task::batch([task, self.notify(notice)]),
                    None => task,
                }
            }
            Message::BannerExpired(generation) => {
                self.banner.expire(generation);
                Task::none()
            }
            Message::DismissBanner => {
                self.banner.dismiss();
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let Some(session) = self.session.current() else {
            return self.login.view().map(Message::Login);
        };

        let id = self.active;
        let page: Element<Message> = match self.pages.get(&id) {
            Some(page) => page.view().map(move |message| Message::Page(id, message)),
            None => text("").into(),
        };

        let mut main = column![shell::header(id.title(), session).map(Message::Shell)];
        if let Some(banner) = self.banner.view(Message::DismissBanner) {
            main = main.push(banner);
        }
        main = main.push(page);

        row![
            self.sidebar.view(id).map(Message::Shell),
            main.width(Length::Fill).height(Length::Fill),
        ]
        .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn boot() -> Result<(AppConfig, ApiClient, SessionStore), AppError> {
    let config = AppConfig::load()?;
    let api = ApiClient::new(&config.api_base_url)?;
    let storage = Storage::open(config.storage_path.clone())?;
    let session = SessionStore::open(storage)?;

    Ok((config, api, session))
}

fn fresh_pages() -> HashMap<PageId, ResourcePage> {
    PageId::ALL
        .into_iter()
        .map(|id| (id, ResourcePage::new(id.resource())))
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shipyard_admin=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application("Shipyard Admin", ShipyardAdmin::update, ShipyardAdmin::view)
        .theme(ShipyardAdmin::theme)
        .centered()
        .run_with(ShipyardAdmin::new)
}
