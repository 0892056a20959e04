//! In-memory doubles shared by the adapter's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::SecretString;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::api::{
    DecoraApi, IotSwitch, Permission, Person, PersonId, Power, Residence, ResidenceId,
    ResidentialAccountId, SwitchId, SwitchUpdate,
};
use crate::error::DecoraError;

pub(crate) fn switch(id: i64, name: &str, model: &str) -> IotSwitch {
    IotSwitch {
        id: SwitchId(id),
        name: name.to_string(),
        model: model.to_string(),
        power: Some("OFF".to_string()),
        brightness: Some(50),
    }
}

fn unavailable() -> DecoraError {
    DecoraError::Api {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum LoginOutcome {
    #[default]
    Accept,
    Reject,
    Unreachable,
}

#[derive(Default)]
struct FakeState {
    login: LoginOutcome,
    permissions: Vec<Permission>,
    residences: HashMap<ResidentialAccountId, Vec<Residence>>,
    switches: HashMap<ResidenceId, Vec<IotSwitch>>,
    remote: HashMap<SwitchId, IotSwitch>,
    failing_residence: Option<ResidenceId>,
    fail_updates: bool,
    fail_fetches: bool,
    fail_logout: bool,
    updates: Vec<(SwitchId, SwitchUpdate)>,
    logins: usize,
    logouts: usize,
    fetches: usize,
}

/// Scriptable [`DecoraApi`] that records every write.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_login(&self, outcome: LoginOutcome) {
        self.state().login = outcome;
    }

    pub(crate) fn add_permission(&self, permission: Permission) {
        self.state().permissions.push(permission);
    }

    pub(crate) fn add_residence(&self, account: ResidentialAccountId, residence: ResidenceId) {
        self.state()
            .residences
            .entry(account)
            .or_default()
            .push(Residence {
                id: residence,
                name: format!("Residence {residence}"),
            });
    }

    /// Attach `switch` to `residence` and make it the remote state of its id.
    pub(crate) fn add_switch(&self, residence: ResidenceId, switch: IotSwitch) {
        let mut state = self.state();
        state.remote.insert(switch.id, switch.clone());
        state.switches.entry(residence).or_default().push(switch);
    }

    pub(crate) fn set_remote(&self, switch: IotSwitch) {
        self.state().remote.insert(switch.id, switch);
    }

    pub(crate) fn fail_residence(&self, residence: ResidenceId) {
        self.state().failing_residence = Some(residence);
    }

    pub(crate) fn fail_updates(&self) {
        self.state().fail_updates = true;
    }

    pub(crate) fn fail_fetches(&self) {
        self.state().fail_fetches = true;
    }

    pub(crate) fn fail_logout(&self) {
        self.state().fail_logout = true;
    }

    pub(crate) fn updates(&self) -> Vec<(SwitchId, SwitchUpdate)> {
        self.state().updates.clone()
    }

    pub(crate) fn logins(&self) -> usize {
        self.state().logins
    }

    pub(crate) fn logouts(&self) -> usize {
        self.state().logouts
    }

    pub(crate) fn fetches(&self) -> usize {
        self.state().fetches
    }
}

impl DecoraApi for FakeApi {
    async fn login(
        &self,
        _email: &str,
        _password: &SecretString,
    ) -> Result<Option<Person>, DecoraError> {
        let mut state = self.state();
        state.logins += 1;
        match state.login {
            LoginOutcome::Accept => Ok(Some(Person { id: PersonId(1) })),
            LoginOutcome::Reject => Ok(None),
            LoginOutcome::Unreachable => Err(unavailable()),
        }
    }

    async fn logout(&self) -> Result<(), DecoraError> {
        let mut state = self.state();
        state.logouts += 1;
        if state.fail_logout {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    async fn residential_permissions(
        &self,
        _person: PersonId,
    ) -> Result<Vec<Permission>, DecoraError> {
        Ok(self.state().permissions.clone())
    }

    async fn residences(
        &self,
        account: ResidentialAccountId,
    ) -> Result<Vec<Residence>, DecoraError> {
        Ok(self
            .state()
            .residences
            .get(&account)
            .cloned()
            .unwrap_or_default())
    }

    async fn iot_switches(&self, residence: ResidenceId) -> Result<Vec<IotSwitch>, DecoraError> {
        let state = self.state();
        if state.failing_residence == Some(residence) {
            return Err(unavailable());
        }
        Ok(state.switches.get(&residence).cloned().unwrap_or_default())
    }

    async fn update_switch(
        &self,
        id: SwitchId,
        update: &SwitchUpdate,
    ) -> Result<IotSwitch, DecoraError> {
        let mut state = self.state();
        state.updates.push((id, update.clone()));
        if state.fail_updates {
            return Err(unavailable());
        }
        let remote = state.remote.get_mut(&id).ok_or(DecoraError::Api {
            status: 404,
            message: format!("unknown switch {id}"),
        })?;
        if let Some(power) = update.power {
            remote.power = Some(
                match power {
                    Power::On => "ON",
                    Power::Off => "OFF",
                }
                .to_string(),
            );
        }
        if let Some(brightness) = update.brightness {
            remote.brightness = Some(i64::from(brightness));
        }
        Ok(remote.clone())
    }

    async fn fetch_switch(&self, id: SwitchId) -> Result<IotSwitch, DecoraError> {
        let mut state = self.state();
        state.fetches += 1;
        if state.fail_fetches {
            return Err(unavailable());
        }
        state.remote.get(&id).cloned().ok_or(DecoraError::Api {
            status: 404,
            message: format!("unknown switch {id}"),
        })
    }
}

struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Count `ERROR` events emitted on this thread until the guard is dropped.
///
/// Works for `#[tokio::test]` bodies since the default runtime there is
/// single-threaded.
pub(crate) fn capture_errors() -> (tracing::subscriber::DefaultGuard, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&counter)));
    (tracing::subscriber::set_default(subscriber), counter)
}

pub(crate) fn count_errors<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let (guard, counter) = capture_errors();
    let out = f();
    drop(guard);
    (out, counter.load(Ordering::SeqCst))
}
