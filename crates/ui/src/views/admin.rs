use dioxus::prelude::*;
use tracing::warn;
use virtuatest_core::model::{
    AccountStatus, AdminReport, AdminStats, AdminUser, CefrLevel, ConfigUpdate, ModuleName,
    NewUser, Role, UserUpdate,
};

use crate::context::AppContext;
use crate::views::{
    ShellState, ViewError, ViewState, report_failure, use_sign_out_on_rejection,
    view_state_from_resource,
};
use crate::vm::{DialogKind, ViewId};

#[derive(Clone, Debug, PartialEq)]
struct AdminData {
    stats: AdminStats,
    users: Vec<AdminUser>,
    reports: Vec<AdminReport>,
}

fn toggled_status(status: &AccountStatus) -> AccountStatus {
    match status {
        AccountStatus::Active => AccountStatus::Suspended,
        _ => AccountStatus::Active,
    }
}

fn set_limit(config: &mut ConfigUpdate, module: ModuleName, seconds: u32) {
    match module {
        ModuleName::Reading => config.reading_time_limit = seconds,
        ModuleName::Listening => config.listening_time_limit = seconds,
        ModuleName::Speaking => config.speaking_time_limit = seconds,
        ModuleName::Writing => config.writing_time_limit = seconds,
    }
}

fn limit_of(config: &ConfigUpdate, module: ModuleName) -> u32 {
    match module {
        ModuleName::Reading => config.reading_time_limit,
        ModuleName::Listening => config.listening_time_limit,
        ModuleName::Speaking => config.speaking_time_limit,
        ModuleName::Writing => config.writing_time_limit,
    }
}

#[component]
pub fn AdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut config = use_signal(|| None::<ConfigUpdate>);
    let active = use_memo(move || shell.is_target(ViewId::Admin));

    let api = ctx.api();
    let resource = use_resource(move || {
        let api = api.clone();
        let active = active();
        async move {
            if !active {
                return Ok(None);
            }
            let stats = api.admin_stats().await?;
            let users = api.admin_users().await?;
            let loaded = api.admin_config().await?;
            config.set(Some(loaded.to_update()));
            let reports = match api.admin_reports().await {
                Ok(reports) => reports,
                Err(err) => {
                    warn!(error = %err, "admin reports unavailable");
                    Vec::new()
                }
            };
            Ok::<_, ViewError>(Some(AdminData {
                stats,
                users,
                reports,
            }))
        }
    });
    use_sign_out_on_rejection(resource);
    let state = view_state_from_resource(resource);

    let back_ctx = ctx.clone();

    rsx! {
        div { class: "page admin-page",
            header { class: "admin-header",
                h2 { "Administration" }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| shell.go(&back_ctx, ViewId::Dashboard),
                    "Dashboard"
                }
            }
            match state {
                ViewState::Idle | ViewState::Ready(None) => rsx! {},
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(Some(data)) => rsx! {
                    StatsCards { stats: data.stats }
                    UsersTable { users: data.users, on_changed: move |()| {
                        let mut resource = resource;
                        resource.restart();
                    } }
                    CreateUserForm { on_created: move |()| {
                        let mut resource = resource;
                        resource.restart();
                    } }
                    ReportsList { reports: data.reports }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
            ConfigForm { config }
        }
    }
}

#[component]
fn ConfigForm(config: Signal<Option<ConfigUpdate>>) -> Element {
    let mut config = config;
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let Some(form) = config.read().clone() else {
        return rsx! {};
    };

    let on_save = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(update) = config.read().clone() else {
            return;
        };
        let ctx = ctx.clone();
        spawn(async move {
            match ctx.api().admin_update_config(&update).await {
                Ok(response) => {
                    ctx.dialogs()
                        .alert(DialogKind::Success, "Configuration saved", response.message)
                        .await;
                }
                Err(err) => report_failure(ctx, shell, "Could not save configuration", err).await,
            }
        });
    };

    rsx! {
        form { class: "card config-form", onsubmit: on_save,
            h3 { "Test configuration" }
            for module in ModuleName::ALL {
                LimitInput { key: "{module}", module, seconds: limit_of(&form, module), config }
            }
            label {
                "Difficulty"
                select {
                    onchange: move |evt| {
                        if let Ok(level) = evt.value().parse::<CefrLevel>() {
                            config.with_mut(|config| {
                                if let Some(config) = config.as_mut() {
                                    config.difficulty = level;
                                }
                            });
                        }
                    },
                    for level in CefrLevel::ALL {
                        option {
                            key: "{level}",
                            value: "{level}",
                            selected: level == form.difficulty,
                            "{level}"
                        }
                    }
                }
            }
            button { class: "btn btn-primary", r#type: "submit", "Save" }
        }
    }
}

#[component]
fn LimitInput(module: ModuleName, seconds: u32, config: Signal<Option<ConfigUpdate>>) -> Element {
    let mut config = config;
    let label = module.label();
    rsx! {
        label {
            "{label} time limit (seconds)"
            input {
                r#type: "number",
                min: "0",
                value: "{seconds}",
                oninput: move |evt| {
                    if let Ok(seconds) = evt.value().trim().parse::<u32>() {
                        config.with_mut(|config| {
                            if let Some(config) = config.as_mut() {
                                set_limit(config, module, seconds);
                            }
                        });
                    }
                },
            }
        }
    }
}

#[component]
fn ReportsList(reports: Vec<AdminReport>) -> Element {
    if reports.is_empty() {
        return rsx! {};
    }
    let titles: Vec<String> = reports
        .iter()
        .map(|report| report.title().unwrap_or("Report").to_string())
        .collect();
    rsx! {
        div { class: "card reports",
            h3 { "Reports" }
            ul {
                for (index, title) in titles.into_iter().enumerate() {
                    li { key: "{index}", "{title}" }
                }
            }
        }
    }
}

#[component]
fn StatsCards(stats: AdminStats) -> Element {
    rsx! {
        div { class: "stats",
            div { class: "stat", span { class: "stat-value", "{stats.total_users}" } span { "Users" } }
            div { class: "stat", span { class: "stat-value", "{stats.active_users}" } span { "Active" } }
            div { class: "stat", span { class: "stat-value", "{stats.total_admins}" } span { "Admins" } }
            div { class: "stat", span { class: "stat-value", "{stats.ai_status}" } span { "AI service" } }
        }
    }
}

#[component]
fn UsersTable(users: Vec<AdminUser>, on_changed: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();

    rsx! {
        table { class: "users",
            thead {
                tr {
                    th { "Email" }
                    th { "Name" }
                    th { "Role" }
                    th { "Status" }
                    th {}
                }
            }
            tbody {
                for user in users {
                    tr { key: "{user.id}",
                        td { "{user.email}" }
                        td { "{user.full_name.as_deref().unwrap_or_default()}" }
                        td { "{user.role}" }
                        td { "{user.account_status}" }
                        td {
                            button {
                                class: "btn btn-secondary",
                                onclick: {
                                    let ctx = ctx.clone();
                                    let id = user.id;
                                    let next = toggled_status(&user.account_status);
                                    move |_| {
                                        let ctx = ctx.clone();
                                        let update = UserUpdate {
                                            account_status: Some(next.clone()),
                                            ..UserUpdate::default()
                                        };
                                        spawn(async move {
                                            match ctx.api().admin_update_user(id, &update).await {
                                                Ok(_) => on_changed.call(()),
                                                Err(err) => {
                                                    report_failure(ctx, shell, "Could not update user", err)
                                                        .await;
                                                }
                                            }
                                        });
                                    }
                                },
                                if user.account_status == AccountStatus::Active { "Suspend" } else { "Activate" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn CreateUserForm(on_created: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let shell = use_context::<ShellState>();
    let mut email = use_signal(String::new);
    let mut full_name = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut admin = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let user = NewUser {
            email: email().trim().to_lowercase(),
            password: password(),
            full_name: full_name().trim().to_string(),
            role: if admin() { Role::Admin } else { Role::Student },
        };
        let ctx = ctx.clone();
        spawn(async move {
            if user.email.is_empty() || user.password.is_empty() || user.full_name.is_empty() {
                ctx.dialogs()
                    .alert(DialogKind::Warning, "Missing details", "All fields are required.")
                    .await;
                return;
            }
            match ctx.api().admin_create_user(&user).await {
                Ok(response) => {
                    email.set(String::new());
                    full_name.set(String::new());
                    password.set(String::new());
                    admin.set(false);
                    on_created.call(());
                    ctx.dialogs()
                        .alert(DialogKind::Success, "User created", response.message)
                        .await;
                }
                Err(err) => report_failure(ctx, shell, "Could not create user", err).await,
            }
        });
    };

    rsx! {
        form { class: "card create-user", onsubmit: on_submit,
            h3 { "New user" }
            input {
                r#type: "email",
                placeholder: "Email",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            input {
                placeholder: "Full name",
                value: "{full_name}",
                oninput: move |evt| full_name.set(evt.value()),
            }
            input {
                r#type: "password",
                placeholder: "Password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            label {
                input {
                    r#type: "checkbox",
                    checked: admin(),
                    onchange: move |evt| admin.set(evt.checked()),
                }
                " Administrator"
            }
            button { class: "btn btn-primary", r#type: "submit", "Create" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtuatest_core::model::TestConfig;

    #[test]
    fn status_toggle_reactivates_unknown_states() {
        assert_eq!(toggled_status(&AccountStatus::Active), AccountStatus::Suspended);
        assert_eq!(toggled_status(&AccountStatus::Suspended), AccountStatus::Active);
        assert_eq!(
            toggled_status(&AccountStatus::Other("Pending".into())),
            AccountStatus::Active
        );
    }

    #[test]
    fn limits_are_edited_per_module() {
        let mut config = TestConfig::default().to_update();
        set_limit(&mut config, ModuleName::Listening, 600);
        assert_eq!(limit_of(&config, ModuleName::Listening), 600);
        assert_eq!(limit_of(&config, ModuleName::Reading), 1200);
    }
}
