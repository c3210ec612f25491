use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{ApiClient, ApiConfig};
use storage::repository::Storage;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::context::{AppContext, UiApp, build_app_context};
use crate::views::{Shell, ShellState, log_out, use_shell_provider};
use crate::vm::{DialogService, RouterTimings, ViewId, ViewRouter};

/// Nothing listens here; requests fail fast with a connection error.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

#[derive(Clone)]
struct TestApp {
    api: Arc<ApiClient>,
    dialogs: DialogService,
    router: ViewRouter,
}

impl UiApp for TestApp {
    fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api)
    }

    fn dialogs(&self) -> DialogService {
        self.dialogs.clone()
    }

    fn router(&self) -> ViewRouter {
        self.router.clone()
    }
}

/// Actions a test asks the running shell to perform.
pub enum ShellCommand {
    LogOut,
}

type CommandSlot = Rc<RefCell<Option<UnboundedReceiver<ShellCommand>>>>;

#[derive(Props, Clone)]
struct ShellHarnessProps {
    app: Arc<TestApp>,
    commands: CommandSlot,
}

impl PartialEq for ShellHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ShellHarness(props: ShellHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    let ctx = use_context_provider(|| build_app_context(&app));
    let shell = use_shell_provider();

    let slot = props.commands.clone();
    use_future(move || {
        let receiver = slot.borrow_mut().take();
        let ctx = ctx.clone();
        async move {
            let Some(mut receiver) = receiver else {
                return;
            };
            while let Some(command) = receiver.recv().await {
                run_command(&ctx, shell, command).await;
            }
        }
    });

    rsx! { Shell {} }
}

async fn run_command(ctx: &AppContext, shell: ShellState, command: ShellCommand) {
    match command {
        ShellCommand::LogOut => log_out(ctx, shell).await,
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub dialogs: DialogService,
    pub router: ViewRouter,
    commands: UnboundedSender<ShellCommand>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive the dom until the router shows `view`, or give up.
    pub async fn drive_until_shown(&mut self, view: ViewId) -> bool {
        for _ in 0..40 {
            if self.router.phase().is_active(view) {
                self.drive_async().await;
                return true;
            }
            self.drive_async().await;
        }
        self.router.phase().is_active(view)
    }

    /// Drive the dom until the rendered html contains `needle`, or give up.
    pub async fn drive_until_rendered(&mut self, needle: &str) -> bool {
        for _ in 0..40 {
            if self.render().contains(needle) {
                return true;
            }
            self.drive_async().await;
        }
        self.render().contains(needle)
    }

    pub fn send(&self, command: ShellCommand) {
        let _ = self.commands.send(command);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(storage: Storage) -> ViewHarness {
    setup_view_harness_with_api(storage, UNREACHABLE_API)
}

pub fn setup_view_harness_with_api(storage: Storage, base_url: &str) -> ViewHarness {
    let config = ApiConfig::parse(base_url).expect("test url");
    let api = Arc::new(ApiClient::new(
        config,
        storage.credentials(),
        storage.session_cache(),
    ));
    let dialogs = DialogService::new();
    let router = ViewRouter::new(ViewId::Login, RouterTimings::immediate());

    let app = Arc::new(TestApp {
        api,
        dialogs: dialogs.clone(),
        router: router.clone(),
    });
    let (commands, receiver) = unbounded_channel();
    let dom = VirtualDom::new_with_props(
        ShellHarness,
        ShellHarnessProps {
            app,
            commands: Rc::new(RefCell::new(Some(receiver))),
        },
    );

    ViewHarness {
        dom,
        storage,
        dialogs,
        router,
        commands,
    }
}
