/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! timers that deliver events into the session channel.
//!
//! Each [`Concern`] has at most one pending timer and a monotonic generation counter. Arming a concern aborts its
//! pending timer and bumps the generation, so everything (timer events, fetch completions) issued under an older
//! generation can be recognized as superseded with [`Scheduler::is_current`] when it arrives.

use std::{collections::HashMap, time::Duration};
use strum::Display;
use tokio::{sync::mpsc, task::AbortHandle, time::sleep};
use tracing::{debug,trace,warn};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Display)]
pub enum Concern {
    RoutePolling,
    UavPolling,
    AisPolling,
    FramePolling,
    Playback,
    FrameFade,
}

#[derive(Debug,Default)]
struct Slot {
    generation: u64,
    task: Option<AbortHandle>,
}

pub struct Scheduler<E> {
    tx: mpsc::Sender<E>,
    slots: HashMap<Concern,Slot>,
    one_shots: Vec<AbortHandle>,
}

impl<E> Scheduler<E> where E: Send + 'static {
    pub fn new (tx: mpsc::Sender<E>) -> Self {
        Scheduler { tx, slots: HashMap::new(), one_shots: Vec::new() }
    }

    pub fn generation (&self, concern: Concern) -> u64 {
        self.slots.get( &concern).map( |s| s.generation).unwrap_or(0)
    }

    pub fn is_current (&self, concern: Concern, generation: u64) -> bool {
        self.generation( concern) == generation
    }

    pub fn is_pending (&self, concern: Concern) -> bool {
        self.slots.get( &concern).and_then( |s| s.task.as_ref()).map( |t| !t.is_finished()).unwrap_or(false)
    }

    /// supersede everything issued for `concern` so far without arming a new timer
    pub fn invalidate (&mut self, concern: Concern) -> u64 {
        let slot = self.slots.entry( concern).or_default();
        if let Some(task) = slot.task.take() { task.abort() }
        slot.generation += 1;
        slot.generation
    }

    /// replace the pending timer of `concern` with one that fires after `delay`. The event is created from the
    /// new generation, which is also returned
    pub fn arm (&mut self, concern: Concern, delay: Duration, make_event: impl FnOnce(u64)->E) -> u64 {
        let generation = self.invalidate( concern);
        let event = make_event( generation);
        let task = self.spawn_timer( delay, event, concern);

        if let Some(slot) = self.slots.get_mut( &concern) { slot.task = Some(task) }
        trace!("armed {concern}[{generation}] in {delay:?}");
        generation
    }

    /// independent one-shot timer that does not replace anything pending, used for overlapping frame fades
    pub fn defer (&mut self, concern: Concern, delay: Duration, event: E) {
        self.one_shots.retain( |t| !t.is_finished());
        let task = self.spawn_timer( delay, event, concern);
        self.one_shots.push( task);
    }

    pub fn pending_one_shots (&self) -> usize {
        self.one_shots.iter().filter( |t| !t.is_finished()).count()
    }

    pub fn shutdown (&mut self) {
        self.abort_all();
        debug!("scheduler shut down");
    }

    fn spawn_timer (&self, delay: Duration, event: E, concern: Concern) -> AbortHandle {
        let tx = self.tx.clone();
        let jh = tokio::spawn( async move {
            if !delay.is_zero() { sleep( delay).await }
            if tx.send( event).await.is_err() {
                warn!("{concern} timer fired after session was closed");
            }
        });
        jh.abort_handle()
    }
}

impl<E> Scheduler<E> {
    fn abort_all (&mut self) {
        for slot in self.slots.values_mut() {
            if let Some(task) = slot.task.take() { task.abort() }
        }
        for task in self.one_shots.drain(..) { task.abort() }
    }
}

impl<E> Drop for Scheduler<E> {
    fn drop (&mut self) {
        self.abort_all()
    }
}
