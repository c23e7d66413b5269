//! The submarine engine
//!
//! Owns the session store for one target contract and applies reveals and
//! sweeps against it. Every entry point takes `&mut self`, so each
//! transition is atomic relative to the session it touches: either all
//! checks pass and the new session is stored, or nothing changes.

use tracing::{info, warn};

use crate::config::SubmarineConfig;
use crate::error::{Result, SubmarineError};
use crate::instructions::reveal::{check_reveal, RevealOutcome, RevealRequest};
use crate::instructions::unlock::{prepare_sweep, sweep_session, UnlockCall};
use crate::ledger::{ChainView, FundsForwarder, SessionObserver, SubmarineEvent};
use crate::state::{Session, SessionStore};
use crate::types::{Address, CommitId};

pub struct Submarine<S: SessionStore, C: ChainView, F: FundsForwarder> {
    target: Address,
    config: SubmarineConfig,
    store: S,
    chain: C,
    forwarder: F,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl<S: SessionStore, C: ChainView, F: FundsForwarder> Submarine<S, C, F> {
    pub fn new(target: Address, config: SubmarineConfig, store: S, chain: C, forwarder: F) -> Result<Self> {
        config.validate()?;
        Ok(Self { target, config, store, chain, forwarder, observers: Vec::new() })
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn config(&self) -> &SubmarineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut C {
        &mut self.chain
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    pub fn forwarder_mut(&mut self) -> &mut F {
        &mut self.forwarder
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Accept a reveal. Revealing an already revealed commitment returns
    /// the stored session without re-checking the proof.
    pub fn reveal(&mut self, request: &RevealRequest) -> Result<Session> {
        match check_reveal(&self.config, &self.store, &self.chain, &self.target, request)? {
            RevealOutcome::AlreadyRevealed(session) => Ok(session),
            RevealOutcome::Accepted { commit_id, session } => {
                self.store.put(commit_id, session)?;
                info!(%commit_id, amount = session.revealed_amount, "commitment revealed");
                self.emit(SubmarineEvent::Revealed { commit_id, amount: session.revealed_amount });
                Ok(session)
            }
        }
    }

    /// Sweep the one-time address into the target and record it.
    ///
    /// The session is stored before the funds move and restored if
    /// forwarding fails.
    pub fn unlock(&mut self, call: &UnlockCall) -> Result<Session> {
        let sweep = prepare_sweep(&self.store, self.config.sweep_policy, call)?;
        let previous = self.store.get(&sweep.commit_id);
        self.store.put(sweep.commit_id, sweep.next)?;

        if let Err(reason) = self.forwarder.forward(&sweep.commit_id, call.value, sweep.embedded) {
            warn!(commit_id = %sweep.commit_id, %reason, "forwarding failed, rolling back sweep");
            match previous {
                Some(session) => self.store.put(sweep.commit_id, session)?,
                None => self.store.remove(&sweep.commit_id)?,
            }
            return Err(SubmarineError::ForwardFailed(reason));
        }

        info!(commit_id = %sweep.commit_id, from = %call.from, amount = call.value, "commitment unlocked");
        self.emit(SubmarineEvent::Unlocked { commit_id: sweep.commit_id, amount: call.value });
        Ok(sweep.next)
    }

    /// Bookkeeping for a transfer that reached the target by other means.
    pub fn record_incoming_transfer(&mut self, commit_id: CommitId, amount: u128) -> Result<Session> {
        let next = sweep_session(&self.store, self.config.sweep_policy, &commit_id, amount)?;
        self.store.put(commit_id, next)?;

        info!(%commit_id, amount, "incoming transfer recorded");
        self.emit(SubmarineEvent::Unlocked { commit_id, amount });
        Ok(next)
    }

    pub fn query_state(&self, commit_id: &CommitId) -> Session {
        self.store.get(commit_id).unwrap_or_default()
    }

    pub fn query_finished(&self, commit_id: &CommitId) -> bool {
        self.query_state(commit_id).is_finished()
    }

    fn emit(&mut self, event: SubmarineEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }
}
