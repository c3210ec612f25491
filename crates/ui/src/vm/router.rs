use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;
use virtuatest_core::model::Credentials;

/// Page sections of the single-window shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewId {
    Login,
    Register,
    Dashboard,
    Test,
    Result,
    History,
    Admin,
}

impl ViewId {
    pub const ALL: [ViewId; 7] = [
        ViewId::Login,
        ViewId::Register,
        ViewId::Dashboard,
        ViewId::Test,
        ViewId::Result,
        ViewId::History,
        ViewId::Admin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Login => "login",
            ViewId::Register => "register",
            ViewId::Dashboard => "dashboard",
            ViewId::Test => "test",
            ViewId::Result => "result",
            ViewId::History => "history",
            ViewId::Admin => "admin",
        }
    }

    #[must_use]
    pub fn requires_login(self) -> bool {
        !matches!(self, ViewId::Login | ViewId::Register)
    }
}

/// Where a navigation currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutePhase {
    /// Nothing is active; `from` stays visible while it fades out.
    Leaving { from: ViewId, to: ViewId },
    /// Only the target is visible, not yet active.
    Entering(ViewId),
    Shown(ViewId),
}

impl RoutePhase {
    /// The view on screen right now.
    #[must_use]
    pub fn visible(self) -> ViewId {
        match self {
            RoutePhase::Leaving { from, .. } => from,
            RoutePhase::Entering(view) | RoutePhase::Shown(view) => view,
        }
    }

    /// The view the router is heading to (or showing).
    #[must_use]
    pub fn target(self) -> ViewId {
        match self {
            RoutePhase::Leaving { to, .. } => to,
            RoutePhase::Entering(view) | RoutePhase::Shown(view) => view,
        }
    }

    #[must_use]
    pub fn is_active(self, view: ViewId) -> bool {
        self == RoutePhase::Shown(view)
    }

    /// CSS classes of `view`'s section.
    #[must_use]
    pub fn class_for(self, view: ViewId) -> &'static str {
        if self.is_active(view) {
            "view active"
        } else if self.visible() == view {
            "view"
        } else {
            "view hidden"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouterTimings {
    pub hide_delay: Duration,
    pub reveal_delay: Duration,
}

impl Default for RouterTimings {
    fn default() -> Self {
        Self {
            hide_delay: Duration::from_millis(300),
            reveal_delay: Duration::from_millis(50),
        }
    }
}

impl RouterTimings {
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            hide_delay: Duration::ZERO,
            reveal_delay: Duration::ZERO,
        }
    }
}

/// Two-step class toggle between page sections. No history.
#[derive(Clone)]
pub struct ViewRouter {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    phase: watch::Sender<RoutePhase>,
    generation: AtomicU64,
    timings: RouterTimings,
}

impl ViewRouter {
    #[must_use]
    pub fn new(initial: ViewId, timings: RouterTimings) -> Self {
        let (phase, _) = watch::channel(RoutePhase::Shown(initial));
        Self {
            inner: Arc::new(RouterInner {
                phase,
                generation: AtomicU64::new(0),
                timings,
            }),
        }
    }

    #[must_use]
    pub fn phase(&self) -> RoutePhase {
        *self.inner.phase.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RoutePhase> {
        self.inner.phase.subscribe()
    }

    #[must_use]
    pub fn timings(&self) -> RouterTimings {
        self.inner.timings
    }

    /// Run the hide/reveal sequence towards `target`.
    ///
    /// Returns false if a later `navigate` took over before this one
    /// finished; the later call decides the final view.
    pub async fn navigate(&self, target: ViewId) -> bool {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let from = self.phase().visible();
        debug!(from = from.as_str(), to = target.as_str(), "navigate");
        self.inner
            .phase
            .send_replace(RoutePhase::Leaving { from, to: target });

        tokio::time::sleep(self.inner.timings.hide_delay).await;
        if !self.is_current(generation) {
            return false;
        }
        self.inner.phase.send_replace(RoutePhase::Entering(target));

        tokio::time::sleep(self.inner.timings.reveal_delay).await;
        if !self.is_current(generation) {
            return false;
        }
        self.inner.phase.send_replace(RoutePhase::Shown(target));
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) == generation
    }
}

/// Login check applied before navigating.
///
/// Signed-out users only reach Login and Register; the admin view needs an
/// admin role.
#[must_use]
pub fn guard(target: ViewId, credentials: Option<&Credentials>) -> ViewId {
    match credentials {
        None if target.requires_login() => ViewId::Login,
        Some(credentials) if target == ViewId::Admin && !credentials.user.role.is_admin() => {
            ViewId::Dashboard
        }
        _ => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtuatest_core::model::{AccessToken, Role, UserId, UserProfile};

    fn credentials(role: Role) -> Credentials {
        Credentials::new(
            AccessToken::new("t"),
            UserProfile {
                id: UserId::new(1),
                email: "a@b.io".into(),
                role,
                full_name: None,
            },
        )
    }

    #[test]
    fn class_for_follows_phase() {
        let leaving = RoutePhase::Leaving {
            from: ViewId::Login,
            to: ViewId::Dashboard,
        };
        assert_eq!(leaving.class_for(ViewId::Login), "view");
        assert_eq!(leaving.class_for(ViewId::Dashboard), "view hidden");

        let entering = RoutePhase::Entering(ViewId::Dashboard);
        assert_eq!(entering.class_for(ViewId::Login), "view hidden");
        assert_eq!(entering.class_for(ViewId::Dashboard), "view");

        let shown = RoutePhase::Shown(ViewId::Dashboard);
        assert_eq!(shown.class_for(ViewId::Dashboard), "view active");
        assert_eq!(shown.class_for(ViewId::History), "view hidden");
    }

    #[tokio::test]
    async fn navigate_passes_through_each_phase() {
        let router = ViewRouter::new(
            ViewId::Login,
            RouterTimings {
                hide_delay: Duration::from_millis(20),
                reveal_delay: Duration::from_millis(5),
            },
        );
        let mut rx = router.subscribe();
        let task = tokio::spawn({
            let router = router.clone();
            async move { router.navigate(ViewId::Dashboard).await }
        });

        let mut seen = Vec::new();
        while seen.last() != Some(&RoutePhase::Shown(ViewId::Dashboard)) {
            rx.changed().await.unwrap();
            seen.push(*rx.borrow_and_update());
        }
        assert!(task.await.unwrap());
        assert_eq!(
            seen,
            vec![
                RoutePhase::Leaving {
                    from: ViewId::Login,
                    to: ViewId::Dashboard,
                },
                RoutePhase::Entering(ViewId::Dashboard),
                RoutePhase::Shown(ViewId::Dashboard),
            ]
        );
    }

    #[tokio::test]
    async fn later_navigation_wins() {
        let router = ViewRouter::new(
            ViewId::Dashboard,
            RouterTimings {
                hide_delay: Duration::from_millis(40),
                reveal_delay: Duration::from_millis(5),
            },
        );
        let first = tokio::spawn({
            let router = router.clone();
            async move { router.navigate(ViewId::History).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = router.navigate(ViewId::Test).await;

        assert!(second);
        assert!(!first.await.unwrap());
        assert_eq!(router.phase(), RoutePhase::Shown(ViewId::Test));
    }

    #[tokio::test]
    async fn immediate_timings_still_end_shown() {
        let router = ViewRouter::new(ViewId::Login, RouterTimings::immediate());
        assert!(router.navigate(ViewId::Register).await);
        assert_eq!(router.phase(), RoutePhase::Shown(ViewId::Register));
    }

    #[test]
    fn guard_sends_anonymous_users_to_login() {
        assert_eq!(guard(ViewId::Dashboard, None), ViewId::Login);
        assert_eq!(guard(ViewId::Admin, None), ViewId::Login);
        assert_eq!(guard(ViewId::Register, None), ViewId::Register);
    }

    #[test]
    fn guard_keeps_admin_view_for_admins() {
        let student = credentials(Role::Student);
        let admin = credentials(Role::Admin);
        assert_eq!(guard(ViewId::Admin, Some(&student)), ViewId::Dashboard);
        assert_eq!(guard(ViewId::Admin, Some(&admin)), ViewId::Admin);
        assert_eq!(guard(ViewId::Test, Some(&student)), ViewId::Test);
    }
}
