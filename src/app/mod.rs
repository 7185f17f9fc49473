//! Session orchestrator: the state machine driving platform selection,
//! query entry, result browsing, and single/batch downloads over one
//! remote session.

pub mod keyboard;
pub mod menu;
pub mod state;
pub mod ui;
pub mod view;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::notify::NotificationBus;
use crate::remote::path::{join_remote_path, local_dest, remote_file_name};
use crate::remote::{list_platforms, search, RemoteFs, SEARCH_LIMIT};
use crate::transfer::{spawn_download, BatchQueue, TransferControl, TransferHandle, TransferOutcome};

use keyboard::{KeyboardEvent, KeyboardState};
use menu::{MenuEvent, MenuState};
use state::{ResultSet, SessionState};
use ui::{NavCommand, Ui};
use view::{Frame, MenuView, Screen, TransferView};

/// Synthetic entry appended to the results menu.
pub const BACK_LABEL: &str = "< Back";

/// Render/prune cadence of the foreground loop.
const TICK: Duration = Duration::from_millis(100);

/// Conditions that end the run after one final notification.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error("No platforms found on the server")]
    NoPlatforms,
}

#[derive(Debug)]
enum Stage {
    PlatformSelect,
    QueryInput,
    ResultsList,
    ConfirmSingle { label: String },
    BatchRunning,
    PostAction,
    ConfirmExit,
    Exit,
}

pub struct App {
    fs: Arc<dyn RemoteFs>,
    bus: NotificationBus,
    control: TransferControl,
    pub state: SessionState,
    dest_root: PathBuf,
    remote_root: String,
    quit: bool,
}

impl App {
    pub fn new(
        fs: Arc<dyn RemoteFs>,
        bus: NotificationBus,
        dest_root: PathBuf,
        remote_root: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            bus,
            control: TransferControl::new(),
            state: SessionState::default(),
            dest_root,
            remote_root: remote_root.into(),
            quit: false,
        }
    }

    /// Drive the state machine until exit or a fatal condition.
    pub async fn run<U: Ui>(&mut self, ui: &mut U) -> Result<(), FatalError> {
        let mut stage = Stage::PlatformSelect;
        loop {
            if self.quit {
                stage = Stage::Exit;
            }
            stage = match stage {
                Stage::PlatformSelect => self.platform_select(ui).await?,
                Stage::QueryInput => self.query_input(ui).await?,
                Stage::ResultsList => self.results_list(ui).await?,
                Stage::ConfirmSingle { label } => self.confirm_single(ui, label).await?,
                Stage::BatchRunning => self.batch_running(ui).await?,
                Stage::PostAction => self.post_action(ui).await?,
                Stage::ConfirmExit => self.confirm_exit(ui).await?,
                Stage::Exit => {
                    info!("Session ended");
                    return Ok(());
                }
            };
        }
    }

    async fn platform_select<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        // Entering platform selection always drops cached results.
        self.state.reset_platform();

        let platforms = match list_platforms(self.fs.as_ref(), &self.remote_root).await {
            Ok(platforms) => platforms,
            Err(e) => {
                self.bus
                    .error(format!("Could not list {}/: {}", self.remote_root, e));
                Vec::new()
            }
        };
        if platforms.is_empty() {
            self.bus.error("No platforms found on the server");
            return Err(FatalError::NoPlatforms);
        }

        let mut menu =
            MenuState::new("Select Platform", platforms.clone(), ui.visible_rows()).with_back(true);
        loop {
            match run_menu(&self.bus, ui, &mut menu, "Confirm = Select | Back = Exit").await {
                MenuEvent::Chosen(idx) => {
                    let platform = platforms[idx].clone();
                    let cached = self
                        .state
                        .results
                        .as_ref()
                        .is_some_and(|r| r.platform == platform);
                    self.state.platform = Some(platform);
                    return Ok(if cached {
                        Stage::ResultsList
                    } else {
                        Stage::QueryInput
                    });
                }
                MenuEvent::BackRequested => return Ok(Stage::ConfirmExit),
                MenuEvent::Quit => return Ok(Stage::Exit),
                MenuEvent::ToggleMulti | MenuEvent::StartBatch => {}
            }
        }
    }

    async fn query_input<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        let Some(platform) = self.state.platform.clone() else {
            return Ok(Stage::PlatformSelect);
        };

        let mut kb = KeyboardState::new(format!("Search in {} (ENTER to confirm)", platform));
        let mut tick = ticker();
        loop {
            self.bus.prune();
            ui.present(&Frame {
                screen: Screen::Keyboard(kb.view()),
                footer: Some("Move = Cursor | Confirm = Key | Back = Platforms".into()),
                notifications: self.bus.snapshot(),
            });
            tokio::select! {
                cmd = ui.next_command() => {
                    match kb.handle(cmd.unwrap_or(NavCommand::Quit)) {
                        Some(KeyboardEvent::Quit) => return Ok(Stage::Exit),
                        Some(KeyboardEvent::Cancelled) => {
                            self.state.reset_platform();
                            return Ok(Stage::PlatformSelect);
                        }
                        Some(KeyboardEvent::Submitted(query)) => {
                            return self.execute_search(ui, platform, query).await;
                        }
                        None => {}
                    }
                }
                _ = tick.tick() => {}
            }
        }
    }

    async fn execute_search<U: Ui>(
        &mut self,
        ui: &mut U,
        platform: String,
        query: String,
    ) -> Result<Stage, FatalError> {
        let base_dir = join_remote_path(&self.remote_root, &platform);
        let paths = search(self.fs.as_ref(), &self.bus, &base_dir, &query, SEARCH_LIMIT).await;

        if paths.is_empty() {
            self.bus.info("No results found.");
            let options = vec![
                "New Search".to_string(),
                "Change Platform".to_string(),
                "Exit".to_string(),
            ];
            let mut menu = MenuState::new("No results. What next?", options, ui.visible_rows());
            return Ok(loop {
                match run_menu(&self.bus, ui, &mut menu, "Confirm = Select").await {
                    MenuEvent::Chosen(0) => break Stage::QueryInput,
                    MenuEvent::Chosen(1) => {
                        self.state.reset_platform();
                        break Stage::PlatformSelect;
                    }
                    MenuEvent::Chosen(_) | MenuEvent::Quit => break Stage::Exit,
                    _ => {}
                }
            });
        }

        self.state.results = Some(ResultSet::build(
            platform,
            base_dir,
            query,
            paths,
            SEARCH_LIMIT,
        ));
        self.state.selection.clear();
        Ok(Stage::ResultsList)
    }

    async fn results_list<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        let Some(results) = self.state.results.clone() else {
            return Ok(Stage::QueryInput);
        };

        let mut options: Vec<String> = results.items.iter().map(|i| i.label.clone()).collect();
        options.push(BACK_LABEL.to_string());
        let mut menu = MenuState::new("Results", options, ui.visible_rows())
            .with_back(true)
            .with_multi_controls(true);

        let mut tick = ticker();
        loop {
            self.bus.prune();
            let mut view = menu.view();
            self.decorate_results(&mut view);
            ui.present(&Frame {
                screen: Screen::Menu(view),
                footer: Some(self.results_footer()),
                notifications: self.bus.snapshot(),
            });
            tokio::select! {
                cmd = ui.next_command() => {
                    match menu.handle(cmd.unwrap_or(NavCommand::Quit)) {
                        Some(MenuEvent::Quit) => return Ok(Stage::Exit),
                        Some(MenuEvent::BackRequested) => {
                            self.state.invalidate_results();
                            return Ok(Stage::QueryInput);
                        }
                        Some(MenuEvent::ToggleMulti) => {
                            if self.state.toggle_multi() {
                                self.bus.info(
                                    "Multi Select ON — choose entries, then start the download",
                                );
                            } else {
                                self.bus.info("Multi Select OFF — selections cleared");
                            }
                        }
                        Some(MenuEvent::StartBatch) => {
                            if self.state.multi_select {
                                if self.state.selection.is_empty() {
                                    self.bus.info("No entries selected");
                                } else {
                                    return Ok(Stage::BatchRunning);
                                }
                            }
                        }
                        Some(MenuEvent::Chosen(idx)) => {
                            let label = menu.options()[idx].clone();
                            if label == BACK_LABEL {
                                self.state.invalidate_results();
                                return Ok(Stage::QueryInput);
                            }
                            if self.state.multi_select {
                                if self.state.toggle_selection(&label) {
                                    self.bus.info(format!("Selected: {}", label));
                                } else {
                                    self.bus.info(format!("Unselected: {}", label));
                                }
                            } else {
                                return Ok(Stage::ConfirmSingle { label });
                            }
                        }
                        None => {}
                    }
                }
                _ = tick.tick() => {}
            }
        }
    }

    async fn confirm_single<U: Ui>(
        &mut self,
        ui: &mut U,
        label: String,
    ) -> Result<Stage, FatalError> {
        let (remote_path, platform) = {
            let Some(results) = self.state.results.as_ref() else {
                return Ok(Stage::QueryInput);
            };
            let Some(remote_path) = results.remote_path_of(&label) else {
                self.bus.error("Invalid selection.");
                return Ok(Stage::ResultsList);
            };
            (remote_path.to_string(), results.platform.clone())
        };

        let options = vec!["No".to_string(), "Yes".to_string()];
        let title = format!("Download '{}'?", label);
        let mut menu = MenuState::new(title, options, ui.visible_rows());
        loop {
            match run_menu(&self.bus, ui, &mut menu, "Confirm = Select").await {
                MenuEvent::Chosen(1) => {
                    let local_path = local_dest(&self.dest_root, &platform, &label);
                    self.control.reset();
                    let handle = spawn_download(
                        self.fs.clone(),
                        remote_path,
                        local_path,
                        self.control.clone(),
                        self.bus.clone(),
                    );
                    let title = format!("Downloading: {}", remote_file_name(&label));
                    self.observe_transfer(ui, handle, title).await;
                    self.control.reset();
                    return Ok(Stage::PostAction);
                }
                MenuEvent::Chosen(_) => return Ok(Stage::PostAction),
                MenuEvent::Quit => return Ok(Stage::Exit),
                _ => {}
            }
        }
    }

    async fn batch_running<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        if let Some(results) = self.state.results.clone() {
            let mut queue = BatchQueue::from_selection(
                results
                    .items
                    .iter()
                    .map(|i| (i.label.as_str(), i.remote_path.as_str())),
                &self.state.selection,
                &self.dest_root,
                &results.platform,
            );
            let total = queue.total();

            self.control.reset();
            while let Some((index, item)) = queue.next_task() {
                let title = format!(
                    "Downloading {}/{}: {}",
                    index,
                    total,
                    remote_file_name(&item.label)
                );
                let handle = spawn_download(
                    self.fs.clone(),
                    item.remote_path,
                    item.local_path,
                    self.control.clone(),
                    self.bus.clone(),
                );
                let outcome = self.observe_transfer(ui, handle, title).await;
                // Cancellation abandons the queue; an ordinary failure
                // moves on, the engine already cleaned up and reported.
                if outcome == TransferOutcome::Cancelled || self.quit {
                    break;
                }
            }
        }

        // Unconditional, whatever the batch outcome was.
        self.state.selection.clear();
        self.state.multi_select = false;
        self.control.reset();
        self.bus.info("Multi Select OFF — selections cleared");

        Ok(Stage::PostAction)
    }

    async fn post_action<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        let options = vec![
            "Choose Another File".to_string(),
            "New Search".to_string(),
            "Change Platform".to_string(),
            "Exit".to_string(),
        ];
        let mut menu = MenuState::new("What next?", options, ui.visible_rows());
        loop {
            match run_menu(&self.bus, ui, &mut menu, "Confirm = Select").await {
                MenuEvent::Chosen(0) => return Ok(Stage::ResultsList),
                MenuEvent::Chosen(1) => {
                    self.state.invalidate_results();
                    return Ok(Stage::QueryInput);
                }
                MenuEvent::Chosen(2) => {
                    self.state.reset_platform();
                    return Ok(Stage::PlatformSelect);
                }
                MenuEvent::Chosen(_) | MenuEvent::Quit => return Ok(Stage::Exit),
                _ => {}
            }
        }
    }

    async fn confirm_exit<U: Ui>(&mut self, ui: &mut U) -> Result<Stage, FatalError> {
        let options = vec!["No".to_string(), "Yes".to_string()];
        let mut menu = MenuState::new(
            "Are you sure you want to exit the Downloader?",
            options,
            ui.visible_rows(),
        );
        loop {
            match run_menu(&self.bus, ui, &mut menu, "Confirm = Select").await {
                MenuEvent::Chosen(1) | MenuEvent::Quit => return Ok(Stage::Exit),
                MenuEvent::Chosen(_) => return Ok(Stage::PlatformSelect),
                _ => {}
            }
        }
    }

    /// Render progress and accept cancellation while one worker runs;
    /// returns only once the worker reached a terminal state.
    async fn observe_transfer<U: Ui>(
        &mut self,
        ui: &mut U,
        mut handle: TransferHandle,
        title: String,
    ) -> TransferOutcome {
        let mut tick = ticker();
        loop {
            self.bus.prune();
            let progress = handle.progress.borrow().clone();
            ui.present(&Frame {
                screen: Screen::Transfer(TransferView {
                    title: title.clone(),
                    progress,
                }),
                footer: Some("Back = Cancel download".into()),
                notifications: self.bus.snapshot(),
            });
            tokio::select! {
                joined = &mut handle.done => {
                    return match joined {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            // Worker panic: contained here, reported once.
                            error!("Transfer worker failed unexpectedly: {}", e);
                            self.bus.error("Download failed: internal worker error");
                            TransferOutcome::Failed
                        }
                    };
                }
                cmd = ui.next_command() => {
                    match cmd {
                        Some(NavCommand::Back) => handle.control.cancel(),
                        Some(NavCommand::Quit) | None => {
                            self.quit = true;
                            handle.control.cancel();
                        }
                        _ => {}
                    }
                }
                _ = tick.tick() => {}
            }
        }
    }

    fn decorate_results(&self, view: &mut MenuView) {
        if !self.state.multi_select {
            return;
        }
        for opt in view.options.iter_mut() {
            if opt.as_str() != BACK_LABEL && self.state.selection.contains(opt.as_str()) {
                *opt = format!("[x] {}", opt);
            }
        }
    }

    fn results_footer(&self) -> String {
        let mut footer = String::from(
            "Confirm = Select | Back = New Search | Multi = Toggle | Start = Batch Download",
        );
        if self.state.multi_select {
            footer.push_str(&format!(" | Multi: ON ({} selected)", self.state.selection.len()));
        } else {
            footer.push_str(" | Multi: OFF");
        }
        footer
    }
}

fn ticker() -> tokio::time::Interval {
    let mut tick = interval(TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

/// Drive one menu until it produces an event.
async fn run_menu<U: Ui>(
    bus: &NotificationBus,
    ui: &mut U,
    menu: &mut MenuState,
    footer: &str,
) -> MenuEvent {
    let mut tick = ticker();
    loop {
        bus.prune();
        ui.present(&Frame {
            screen: Screen::Menu(menu.view()),
            footer: Some(footer.to_string()),
            notifications: bus.snapshot(),
        });
        tokio::select! {
            cmd = ui.next_command() => {
                if let Some(event) = menu.handle(cmd.unwrap_or(NavCommand::Quit)) {
                    return event;
                }
            }
            _ = tick.tick() => {}
        }
    }
}
