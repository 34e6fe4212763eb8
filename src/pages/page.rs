/// The one page type behind every navigation entry
///
/// A `ResourcePage` wires a `PageController` to the API client and the
/// views. It turns button presses into controller calls, controller
/// answers into requests, and request results back into controller calls.
/// Anything the user should read comes back as a `Notice` for the banner.
use iced::widget::{column, container, row, text};
use iced::{Element, Length, Task};
use serde_json::Value;

use crate::api::image::{fetch_preview, PreviewPixels};
use crate::api::ApiClient;
use crate::error::{ApiError, ControllerError};
use crate::state::controller::{DeleteAction, EditKind, LoadTicket, PageController, Pending, Phase, SaveAction, SelectOutcome};
use crate::state::criteria::SearchCriteria;
use crate::state::data::{Fields, Record, RecordKey};
use crate::state::resource::Resource;
use crate::ui::banner::Notice;
use crate::ui::controls;
use crate::ui::detail::{self, DetailEvent};
use crate::ui::dialog;
use crate::ui::grid::{self, GridEvent};
use crate::ui::search::SearchBar;

const DISCARD_PROMPT: &str = "저장하지 않은 신규 행이 있습니다. 버리고 이동하시겠습니까?";
const DELETE_PROMPT: &str = "선택한 항목을 삭제하시겠습니까?";
const DELETE_IMAGE_PROMPT: &str = "이미지를 삭제하시겠습니까?";

#[derive(Debug, Clone)]
pub enum PageMessage {
    /// Search input at `index` of the resource's search fields
    SearchChanged(usize, String),
    Search,
    Loaded(LoadTicket, Result<Vec<Fields>, ApiError>),
    Grid(GridEvent),
    /// Clicks on the read-only sub-grid
    SubGrid(GridEvent),
    Detail(DetailEvent),
    Insert,
    Save,
    Delete,
    /// Throw away the selected unsaved row
    Discard,
    Saved(Pending, Result<(), ApiError>),
    DetailsLoaded(RecordKey, Result<Vec<Fields>, ApiError>),
    ImageLoaded(String, Result<PreviewPixels, ApiError>),
    DeleteImage,
    ImageDeleted(Result<(), ApiError>),
}

pub struct ResourcePage {
    controller: PageController,
    /// One value per search field, in field order
    search_values: Vec<String>,
    /// Sub-grid definition, present when the resource has detail lines
    details_resource: Option<Resource>,
    details: Vec<Record>,
    details_for: Option<RecordKey>,
    preview: Option<iced::widget::image::Handle>,
    image_for: Option<String>,
    confirm: fn(&str) -> bool,
}

impl ResourcePage {
    pub fn new(resource: Resource) -> Self {
        let search_values = resource
            .search
            .iter()
            .map(|column| column.input_text(Some(&column.blank_value())))
            .collect();

        let details_resource = resource.details.as_ref().map(|sub| {
            Resource::new(sub.title, sub.segment, sub.key_field).columns(sub.columns.clone())
        });

        Self {
            controller: PageController::new(resource),
            search_values,
            details_resource,
            details: Vec::new(),
            details_for: None,
            preview: None,
            image_for: None,
            confirm: dialog::confirm,
        }
    }

    /// Replace the native yes/no prompt
    pub fn with_confirm(mut self, confirm: fn(&str) -> bool) -> Self {
        self.confirm = confirm;
        self
    }

    #[cfg(test)]
    pub fn controller(&self) -> &PageController {
        &self.controller
    }

    #[cfg(test)]
    pub fn details(&self) -> &[Record] {
        &self.details
    }

    #[cfg(test)]
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Criteria from the visible search inputs, blanks left out
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria::from_inputs(
            self.controller
                .resource()
                .search
                .iter()
                .zip(&self.search_values)
                .map(|(column, value)| (column.accessor, value.as_str())),
        )
    }

    /// First load when the page is shown; later visits keep their rows
    pub fn mount(&mut self, api: &ApiClient) -> Task<PageMessage> {
        if self.controller.phase() == Phase::Idle {
            self.load(api)
        } else {
            Task::none()
        }
    }

    pub fn load(&mut self, api: &ApiClient) -> Task<PageMessage> {
        let (ticket, criteria) = self.start_load();
        let path = self.controller.resource().path;
        let api = api.clone();

        Task::perform(
            async move { api.list(path, &criteria).await },
            move |result| PageMessage::Loaded(ticket, result),
        )
    }

    fn start_load(&mut self) -> (LoadTicket, SearchCriteria) {
        let criteria = self.criteria();
        let ticket = self.controller.begin_load();
        tracing::info!(
            resource = self.controller.resource().path,
            filters = criteria.len(),
            "loading"
        );
        (ticket, criteria)
    }

    pub fn update(&mut self, message: PageMessage, api: &ApiClient) -> (Task<PageMessage>, Option<Notice>) {
        match message {
            PageMessage::SearchChanged(index, value) => {
                if let Some(slot) = self.search_values.get_mut(index) {
                    *slot = value;
                }
                (Task::none(), None)
            }
            PageMessage::Search => {
                if self.controller.is_busy() {
                    return (Task::none(), None);
                }
                (self.load(api), None)
            }
            PageMessage::Loaded(ticket, Ok(rows)) => {
                let count = rows.len();
                if !self.controller.finish_load(ticket, rows) {
                    return (Task::none(), None);
                }
                tracing::info!(resource = self.controller.resource().path, rows = count, "loaded");

                // sub-resources and images may have changed with the rows
                self.details.clear();
                self.details_for = None;
                self.preview = None;
                self.image_for = None;
                (self.follow_selection(api), None)
            }
            PageMessage::Loaded(ticket, Err(err)) => {
                if !self.controller.load_failed(ticket) {
                    return (Task::none(), None);
                }
                tracing::warn!(resource = self.controller.resource().path, %err, "load failed");
                (Task::none(), Some(Notice::error(format!("조회 실패: {err}"))))
            }
            PageMessage::Grid(GridEvent::RowClicked(identity)) => {
                let mut outcome = self.controller.select(&identity, false);
                if outcome == SelectOutcome::NeedsConfirmation && (self.confirm)(DISCARD_PROMPT) {
                    outcome = self.controller.select(&identity, true);
                }
                match outcome {
                    SelectOutcome::Selected => (self.follow_selection(api), None),
                    _ => (Task::none(), None),
                }
            }
            PageMessage::Grid(GridEvent::CellChanged(identity, accessor, value)) => {
                if let Err(err) = self.controller.edit_row(&identity, accessor, &value) {
                    tracing::debug!(accessor, %err, "cell edit refused");
                }
                (Task::none(), None)
            }
            PageMessage::SubGrid(_) => (Task::none(), None),
            PageMessage::Detail(DetailEvent::FieldChanged(accessor, value)) => {
                if let Err(err) = self.controller.edit_field(accessor, &value) {
                    tracing::debug!(accessor, %err, "field edit refused");
                }
                (Task::none(), None)
            }
            PageMessage::Insert => match self.controller.insert() {
                Ok(_) => (self.follow_selection(api), None),
                Err(err) => {
                    tracing::debug!(%err, "insert refused");
                    (Task::none(), None)
                }
            },
            PageMessage::Save => self.save(api),
            PageMessage::Delete => self.delete(api),
            PageMessage::Discard => {
                if let Some(Record::New { temp_id, .. }) = self.controller.selected() {
                    let temp_id = *temp_id;
                    self.controller.discard_new(temp_id);
                    return (self.follow_selection(api), None);
                }
                (Task::none(), None)
            }
            PageMessage::Saved(pending, Ok(())) => {
                self.controller.dispatch_succeeded();
                let text = match pending {
                    Pending::Delete => "삭제되었습니다",
                    Pending::Create | Pending::Update => "저장되었습니다",
                };
                (self.load(api), Some(Notice::info(text)))
            }
            PageMessage::Saved(pending, Err(err)) => {
                self.controller.dispatch_failed();
                tracing::warn!(resource = self.controller.resource().path, ?pending, %err, "dispatch failed");
                let text = match pending {
                    Pending::Delete => format!("삭제 실패: {err}"),
                    Pending::Create | Pending::Update => format!("저장 실패: {err}"),
                };
                (Task::none(), Some(Notice::error(text)))
            }
            PageMessage::DetailsLoaded(key, result) => {
                if self.details_for.as_ref() != Some(&key) {
                    tracing::debug!(%key, "stale detail lines dropped");
                    return (Task::none(), None);
                }
                match result {
                    Ok(rows) => {
                        let key_field = self.details_resource.as_ref().map_or("", |r| r.key_field);
                        self.details = rows
                            .into_iter()
                            .filter_map(|fields| Record::persisted(fields, key_field))
                            .collect();
                        (Task::none(), None)
                    }
                    Err(err) => {
                        tracing::warn!(%key, %err, "detail lines failed");
                        (Task::none(), Some(Notice::error(format!("상세 조회 실패: {err}"))))
                    }
                }
            }
            PageMessage::ImageLoaded(image_id, result) => {
                if self.image_for.as_deref() != Some(image_id.as_str()) {
                    return (Task::none(), None);
                }
                match result {
                    Ok(pixels) => {
                        self.preview = Some(iced::widget::image::Handle::from_rgba(
                            pixels.width,
                            pixels.height,
                            pixels.rgba,
                        ));
                        (Task::none(), None)
                    }
                    Err(err) => {
                        tracing::warn!(%image_id, %err, "image failed");
                        (Task::none(), Some(Notice::error("이미지를 불러오지 못했습니다")))
                    }
                }
            }
            PageMessage::DeleteImage => {
                let Some(image_id) = self.image_for.clone() else {
                    return (Task::none(), None);
                };
                if !(self.confirm)(DELETE_IMAGE_PROMPT) {
                    return (Task::none(), None);
                }
                let api = api.clone();
                (
                    Task::perform(
                        async move { api.delete_image(&image_id).await },
                        PageMessage::ImageDeleted,
                    ),
                    None,
                )
            }
            PageMessage::ImageDeleted(Ok(())) => {
                self.preview = None;
                let notice = Some(Notice::info("이미지가 삭제되었습니다"));
                if self.controller.is_editing() || self.controller.is_busy() {
                    // unsaved edits stay; the reload after saving brings the cleared field
                    self.image_for = None;
                    return (Task::none(), notice);
                }
                (self.load(api), notice)
            }
            PageMessage::ImageDeleted(Err(err)) => {
                tracing::warn!(%err, "image delete failed");
                (Task::none(), Some(Notice::error(format!("이미지 삭제 실패: {err}"))))
            }
        }
    }

    fn save(&mut self, api: &ApiClient) -> (Task<PageMessage>, Option<Notice>) {
        let action = match self.controller.save() {
            Ok(action) => action,
            Err(ControllerError::Validation(err)) => return (Task::none(), Some(Notice::error(err.to_string()))),
            Err(err) => {
                tracing::debug!(%err, "save refused");
                return (Task::none(), None);
            }
        };

        let resource = self.controller.resource();
        let path = resource.path;
        let segment = resource.bulk.segment();

        let (pending, updates, create) = match action {
            SaveAction::BeginEdit => return (Task::none(), None),
            SaveAction::Update(updates) => (Pending::Update, updates, Vec::new()),
            SaveAction::Create(create) => (Pending::Create, Vec::new(), create),
            SaveAction::UpdateThenCreate { updates, create } => (Pending::Create, updates, create),
        };
        tracing::info!(resource = path, updates = updates.len(), creates = create.len(), "saving");

        let task = Task::perform(
            send_changes(api.clone(), path, segment, updates, create),
            move |result| PageMessage::Saved(pending, result),
        );
        (task, None)
    }

    fn delete(&mut self, api: &ApiClient) -> (Task<PageMessage>, Option<Notice>) {
        if self.controller.selected().is_none() || self.controller.is_busy() {
            return (Task::none(), None);
        }
        if !(self.confirm)(DELETE_PROMPT) {
            return (Task::none(), None);
        }

        match self.controller.delete() {
            Ok(DeleteAction::Discarded) => (self.follow_selection(api), None),
            Ok(DeleteAction::Remote(key)) => {
                let path = self.controller.resource().path;
                let api = api.clone();
                tracing::info!(resource = path, %key, "deleting");
                (
                    Task::perform(
                        async move { api.delete(path, &key).await },
                        |result| PageMessage::Saved(Pending::Delete, result),
                    ),
                    None,
                )
            }
            Err(err) => {
                tracing::debug!(%err, "delete refused");
                (Task::none(), None)
            }
        }
    }

    /// Fetch detail lines and the image of the selected record when it changed
    fn follow_selection(&mut self, api: &ApiClient) -> Task<PageMessage> {
        let resource = self.controller.resource();
        let path = resource.path;
        let segment = resource.details.as_ref().map(|sub| sub.segment);
        let selected = self.controller.selected().filter(|r| !r.is_new());
        let key = selected.and_then(Record::key).cloned();
        let image_id = resource
            .image_field
            .and_then(|field| selected.and_then(|r| r.get(field)))
            .and_then(image_id);

        let mut tasks = Vec::new();

        if let Some(segment) = segment {
            if self.details_for != key {
                self.details.clear();
                self.details_for = key.clone();
                if let Some(key) = key {
                    let api = api.clone();
                    tasks.push(Task::perform(
                        {
                            let key = key.clone();
                            async move { api.list_children(path, &key, segment).await }
                        },
                        move |result| PageMessage::DetailsLoaded(key.clone(), result),
                    ));
                }
            }
        }

        if self.image_for != image_id {
            self.preview = None;
            self.image_for = image_id.clone();
            if let Some(image_id) = image_id {
                tasks.push(Task::perform(
                    fetch_preview(api.clone(), image_id.clone()),
                    move |result| PageMessage::ImageLoaded(image_id.clone(), result),
                ));
            }
        }

        Task::batch(tasks)
    }

    /// Label of the save button for the current phase
    pub fn save_label(&self) -> &'static str {
        match self.controller.phase() {
            Phase::Editing(EditKind::New) => "저장",
            Phase::Editing(EditKind::Existing) => "수정 완료",
            _ if self.controller.has_new_rows() => "저장",
            _ => "수정",
        }
    }

    pub fn view(&self) -> Element<'_, PageMessage> {
        let resource = self.controller.resource();
        let busy = self.controller.is_busy();
        let selected = self.controller.selected();
        let idle = |message: PageMessage| (!busy).then_some(message);

        let mut bar = SearchBar::new();
        for (index, (column, value)) in resource.search.iter().zip(&self.search_values).enumerate() {
            bar = bar.input(controls::field(
                column,
                value,
                Some(Box::new(move |input: String| PageMessage::SearchChanged(index, input))),
            ));
        }
        bar = bar
            .action(controls::search_button(idle(PageMessage::Search)))
            .action(controls::insert_button(idle(PageMessage::Insert)))
            .action(controls::save_button(self.save_label(), idle(PageMessage::Save)));
        if selected.is_some_and(Record::is_new) {
            bar = bar.action(controls::danger_button("취소", idle(PageMessage::Discard)));
        }
        bar = bar.action(controls::danger_button(
            "삭제",
            selected.and_then(|_| idle(PageMessage::Delete)),
        ));

        let grid = grid::view(resource, self.controller.rows(), selected.map(Record::identity)).map(PageMessage::Grid);

        let mut side = column![detail::view(&self.controller).map(PageMessage::Detail)].spacing(12);

        if let Some(details_resource) = &self.details_resource {
            side = side.push(text(details_resource.title).size(15)).push(
                container(grid::view(details_resource, &self.details, None).map(PageMessage::SubGrid))
                    .height(Length::Fixed(240.0))
                    .style(container::bordered_box),
            );
        }

        if resource.image_field.is_some() {
            side = side.push(self.image_view(busy));
        }

        column![
            bar.view(),
            row![
                container(grid).width(Length::FillPortion(3)).height(Length::Fill),
                container(side).width(Length::FillPortion(2)),
            ]
            .spacing(12)
            .height(Length::Fill),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    fn image_view(&self, busy: bool) -> Element<'_, PageMessage> {
        match &self.preview {
            Some(handle) => column![
                iced::widget::image(handle.clone()).width(Length::Fixed(320.0)),
                controls::danger_button("이미지 삭제", (!busy).then_some(PageMessage::DeleteImage)),
            ]
            .spacing(8)
            .into(),
            None if self.image_for.is_some() => text("이미지 불러오는 중...").size(13).into(),
            None => text("이미지 없음").size(13).into(),
        }
    }
}

/// `PUT` each changed record in order, then create the new rows: one row
/// with a plain `POST`, several with the resource's bulk route. The first
/// failure stops the rest.
async fn send_changes(
    api: ApiClient,
    path: &'static str,
    segment: &'static str,
    updates: Vec<(RecordKey, Fields)>,
    create: Vec<Fields>,
) -> Result<(), ApiError> {
    for (key, fields) in &updates {
        api.update(path, key, fields).await?;
    }
    match create.as_slice() {
        [] => Ok(()),
        [single] => api.create(path, single).await,
        rows => api.create_many(path, segment, rows).await,
    }
}

/// Image ids come as strings or numbers; blanks mean no image
fn image_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::catalog;
    use crate::state::data::Identity;
    use serde_json::json;

    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9").unwrap()
    }

    fn rows(value: serde_json::Value) -> Vec<Fields> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn loaded(resource: Resource, data: serde_json::Value, confirm: fn(&str) -> bool) -> ResourcePage {
        let mut page = ResourcePage::new(resource).with_confirm(confirm);
        let (ticket, _) = page.start_load();
        page.update(PageMessage::Loaded(ticket, Ok(rows(data))), &api());
        page
    }

    #[test]
    fn test_search_inputs_start_blank() {
        let page = ResourcePage::new(catalog::materials());

        assert_eq!(page.search_values, vec![String::new(), String::new()]);
        assert!(page.criteria().is_empty());
    }

    #[test]
    fn test_search_changes_build_criteria() {
        let mut page = ResourcePage::new(catalog::materials());
        page.update(PageMessage::SearchChanged(0, " Steel ".into()), &api());
        page.update(PageMessage::SearchChanged(1, "원자재".into()), &api());
        page.update(PageMessage::SearchChanged(1, String::new()), &api());

        let criteria = page.criteria();
        assert_eq!(criteria.get("materialNm"), Some("Steel"));
        assert_eq!(criteria.get("materialType"), None);
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut page = ResourcePage::new(catalog::materials());
        let (first, _) = page.start_load();
        let (second, _) = page.start_load();

        page.update(
            PageMessage::Loaded(second, Ok(rows(json!([{"materialId": 2, "materialNm": "Pipe"}])))),
            &api(),
        );
        let (_, notice) = page.update(PageMessage::Loaded(first, Err(ApiError::decode(&api().endpoint(&["materials"]), "x"))), &api());

        assert!(notice.is_none());
        assert_eq!(page.controller().rows().len(), 1);
    }

    #[test]
    fn test_failed_load_reports_and_keeps_rows() {
        let mut page = loaded(catalog::materials(), json!([{"materialId": 1, "materialNm": "Steel"}]), |_| true);
        let (ticket, _) = page.start_load();

        let err = ApiError::Status {
            method: "GET",
            url: "http://127.0.0.1:9/api/materials".into(),
            status: 500,
        };
        let (_, notice) = page.update(PageMessage::Loaded(ticket, Err(err)), &api());

        assert!(notice.unwrap().text.starts_with("조회 실패"));
        assert_eq!(page.controller().rows().len(), 1);
        assert_eq!(page.controller().phase(), Phase::Loaded);
    }

    #[test]
    fn test_invalid_batch_is_reported_not_sent() {
        let mut page = loaded(catalog::materials(), json!([]), |_| true);
        page.update(PageMessage::Insert, &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("materialNm", "Steel".into())), &api());
        page.update(PageMessage::Insert, &api());

        let (_, notice) = page.update(PageMessage::Save, &api());

        let notice = notice.unwrap();
        assert_eq!(notice.text, "필수 항목 누락: 1행 자재명");
        assert_eq!(page.controller().phase(), Phase::Editing(EditKind::New));
    }

    #[test]
    fn test_save_label_follows_phase() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| true,
        );
        assert_eq!(page.save_label(), "수정");

        page.update(PageMessage::Save, &api());
        assert_eq!(page.save_label(), "수정 완료");

        page.update(PageMessage::Insert, &api());
        assert_eq!(page.save_label(), "저장");
    }

    #[test]
    fn test_declined_confirmation_keeps_new_row() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| false,
        );
        page.update(PageMessage::Insert, &api());

        page.update(
            PageMessage::Grid(GridEvent::RowClicked(Identity::Key(RecordKey::new("C-1")))),
            &api(),
        );
        assert!(page.controller().has_new_rows());
        assert!(page.controller().selected().unwrap().is_new());

        page.update(PageMessage::Delete, &api());
        assert_eq!(page.controller().rows().len(), 2);
    }

    #[test]
    fn test_confirmed_row_change_drops_new_rows() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| true,
        );
        page.update(PageMessage::Insert, &api());

        page.update(
            PageMessage::Grid(GridEvent::RowClicked(Identity::Key(RecordKey::new("C-1")))),
            &api(),
        );

        assert!(!page.controller().has_new_rows());
        assert_eq!(page.controller().rows().len(), 1);
    }

    #[test]
    fn test_discard_and_local_delete_of_new_rows() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| true,
        );
        let before = page.controller().rows().to_vec();

        page.update(PageMessage::Insert, &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("customerNm", "B".into())), &api());
        page.update(PageMessage::Discard, &api());
        assert_eq!(page.controller().rows(), before.as_slice());

        page.update(PageMessage::Insert, &api());
        let (_, notice) = page.update(PageMessage::Delete, &api());
        assert!(notice.is_none());
        assert_eq!(page.controller().rows(), before.as_slice());
    }

    #[test]
    fn test_failed_save_reports_and_restores_phase() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| true,
        );
        page.update(PageMessage::Save, &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("customerNm", "B".into())), &api());
        page.update(PageMessage::Save, &api());
        assert_eq!(page.controller().phase(), Phase::Saving(Pending::Update));

        let err = ApiError::Transport {
            url: "http://127.0.0.1:9/api/customers/C-1".into(),
            message: "connection refused".into(),
        };
        let (_, notice) = page.update(PageMessage::Saved(Pending::Update, Err(err)), &api());

        assert!(notice.unwrap().text.starts_with("저장 실패"));
        assert_eq!(page.controller().phase(), Phase::Editing(EditKind::Existing));
        assert_eq!(page.controller().rows()[0].get("customerNm"), Some(&json!("B")));
    }

    #[test]
    fn test_successful_save_reloads() {
        let mut page = loaded(
            catalog::customers(),
            json!([{"customerId": "C-1", "customerNm": "A"}]),
            |_| true,
        );
        page.update(PageMessage::Save, &api());
        page.update(PageMessage::Save, &api());

        let (_, notice) = page.update(PageMessage::Saved(Pending::Update, Ok(())), &api());

        assert_eq!(notice, Some(Notice::info("저장되었습니다")));
        assert_eq!(page.controller().phase(), Phase::Loading);
    }

    #[test]
    fn test_detail_lines_follow_selected_order() {
        let mut page = loaded(
            catalog::purchase_orders(),
            json!([{"poId": 10, "customerId": "C-1"}, {"poId": 11, "customerId": "C-2"}]),
            |_| true,
        );
        let lines = rows(json!([{"detailId": 1, "materialNm": "Plate", "quantity": 4}]));

        // first order is selected after load; a late answer for another order is ignored
        page.update(PageMessage::DetailsLoaded(RecordKey::new("11"), Ok(lines.clone())), &api());
        assert!(page.details().is_empty());

        page.update(PageMessage::DetailsLoaded(RecordKey::new("10"), Ok(lines)), &api());
        assert_eq!(page.details().len(), 1);

        page.update(
            PageMessage::Grid(GridEvent::RowClicked(Identity::Key(RecordKey::new("11")))),
            &api(),
        );
        assert!(page.details().is_empty());
    }

    #[test]
    fn test_image_preview_for_selected_vessel_only() {
        let mut page = loaded(
            catalog::vessels(),
            json!([{"vesselId": "H-1", "imageId": 5}, {"vesselId": "H-2", "imageId": ""}]),
            |_| true,
        );
        let pixels = PreviewPixels {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        };

        page.update(PageMessage::ImageLoaded("6".into(), Ok(pixels.clone())), &api());
        assert!(!page.has_preview());

        page.update(PageMessage::ImageLoaded("5".into(), Ok(pixels)), &api());
        assert!(page.has_preview());

        page.update(
            PageMessage::Grid(GridEvent::RowClicked(Identity::Key(RecordKey::new("H-2")))),
            &api(),
        );
        assert!(!page.has_preview());
    }

    fn vessel_with_preview(confirm: fn(&str) -> bool) -> ResourcePage {
        let mut page = loaded(
            catalog::vessels(),
            json!([{"vesselId": "H-1", "vesselNm": "Aurora", "customerId": "C-1", "imageId": 5}]),
            confirm,
        );
        let pixels = PreviewPixels {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        };
        page.update(PageMessage::ImageLoaded("5".into(), Ok(pixels)), &api());
        assert!(page.has_preview());
        page
    }

    #[test]
    fn test_declined_image_delete_changes_nothing() {
        let mut page = vessel_with_preview(|_| false);

        let (_, notice) = page.update(PageMessage::DeleteImage, &api());

        assert!(notice.is_none());
        assert!(page.has_preview());
        assert_eq!(page.controller().phase(), Phase::Loaded);
    }

    #[test]
    fn test_deleted_image_drops_preview_and_reloads() {
        let mut page = vessel_with_preview(|_| true);
        page.update(PageMessage::DeleteImage, &api());
        // still shown until the server answers
        assert!(page.has_preview());

        let (_, notice) = page.update(PageMessage::ImageDeleted(Ok(())), &api());

        assert_eq!(notice, Some(Notice::info("이미지가 삭제되었습니다")));
        assert!(!page.has_preview());
        assert_eq!(page.controller().phase(), Phase::Loading);
    }

    #[test]
    fn test_failed_image_delete_keeps_preview() {
        let mut page = vessel_with_preview(|_| true);
        let err = ApiError::Status {
            method: "DELETE",
            url: "http://127.0.0.1:9/api/images/5".into(),
            status: 404,
        };

        let (_, notice) = page.update(PageMessage::ImageDeleted(Err(err)), &api());

        assert!(notice.unwrap().text.starts_with("이미지 삭제 실패"));
        assert!(page.has_preview());
        assert_eq!(page.controller().phase(), Phase::Loaded);
    }

    #[test]
    fn test_deleted_image_does_not_reload_over_unsaved_edits() {
        let mut page = vessel_with_preview(|_| true);
        page.update(PageMessage::Save, &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("vesselNm", "Borealis".into())), &api());

        let (_, notice) = page.update(PageMessage::ImageDeleted(Ok(())), &api());

        assert_eq!(notice, Some(Notice::info("이미지가 삭제되었습니다")));
        assert!(!page.has_preview());
        assert_eq!(page.controller().phase(), Phase::Editing(EditKind::Existing));
        assert_eq!(page.controller().rows()[0].get("vesselNm"), Some(&json!("Borealis")));
    }

    #[test]
    fn test_new_row_and_grid_edit_are_saved_together() {
        let mut page = loaded(
            catalog::inventory(),
            json!([{"inventoryId": 1, "materialId": 3, "warehouse": "A", "quantity": 5}]),
            |_| true,
        );
        page.update(PageMessage::Insert, &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("materialId", "7".into())), &api());
        page.update(PageMessage::Detail(DetailEvent::FieldChanged("warehouse", "B".into())), &api());
        page.update(
            PageMessage::Grid(GridEvent::CellChanged(
                Identity::Key(RecordKey::new("1")),
                "quantity",
                "99".into(),
            )),
            &api(),
        );

        let (_, notice) = page.update(PageMessage::Save, &api());
        assert!(notice.is_none());
        assert_eq!(page.controller().phase(), Phase::Saving(Pending::Create));

        // a failure keeps both the new row and the edited quantity
        let err = ApiError::Transport {
            url: "http://127.0.0.1:9/api/inventory/1".into(),
            message: "connection refused".into(),
        };
        page.update(PageMessage::Saved(Pending::Create, Err(err)), &api());
        assert!(page.controller().has_new_rows());
        let saved = page
            .controller()
            .rows()
            .iter()
            .find(|r| r.matches(&Identity::Key(RecordKey::new("1"))))
            .unwrap();
        assert_eq!(saved.get("quantity"), Some(&json!(99)));
    }

    #[tokio::test]
    async fn test_send_changes_updates_before_creating() {
        let mut server = mockito::Server::new_async().await;
        let update = server
            .mock("PUT", "/api/inventory/1")
            .match_body(mockito::Matcher::PartialJson(json!({"quantity": 99})))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/inventory")
            .match_body(mockito::Matcher::Json(json!({"materialId": 7, "warehouse": "B"})))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let updates = vec![(RecordKey::new("1"), rows(json!([{"inventoryId": 1, "quantity": 99}])).remove(0))];
        let create_rows = rows(json!([{"materialId": 7, "warehouse": "B"}]));

        send_changes(api, "inventory", "bulk", updates, create_rows)
            .await
            .unwrap();

        update.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_changes_stops_at_first_failure() {
        let mut server = mockito::Server::new_async().await;
        let _update = server
            .mock("PUT", "/api/inventory/1")
            .with_status(500)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/inventory/bulk")
            .expect(0)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let updates = vec![(RecordKey::new("1"), rows(json!([{"quantity": 99}])).remove(0))];
        let create_rows = rows(json!([{"warehouse": "B"}, {"warehouse": "C"}]));

        let err = send_changes(api, "inventory", "bulk", updates, create_rows)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        create.assert_async().await;
    }

    #[test]
    fn test_image_id_values() {
        assert_eq!(image_id(&json!(" img-1 ")), Some("img-1".into()));
        assert_eq!(image_id(&json!(7)), Some("7".into()));
        assert_eq!(image_id(&json!("")), None);
        assert_eq!(image_id(&json!(null)), None);
    }
}
