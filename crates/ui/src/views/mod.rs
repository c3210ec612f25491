mod admin;
mod assessment;
mod dashboard;
mod dialog_host;
mod history;
mod login;
mod register;
mod result;
mod shell;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use admin::AdminView;
pub use assessment::TestView;
pub use dashboard::DashboardView;
pub use dialog_host::DialogHost;
pub use history::HistoryView;
pub use login::LoginView;
pub use register::RegisterView;
pub use result::ResultView;
pub use shell::{
    Shell, ShellState, landing_view, log_out, report_failure, use_shell_provider,
    use_sign_out_on_rejection,
};
pub use state::{ViewError, ViewState, view_state_from_resource};
