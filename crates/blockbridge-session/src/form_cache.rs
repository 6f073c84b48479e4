//! Per-session form correlation.
//!
//! Every form shown to a client gets an id; the client echoes that id in its
//! response and the cache routes the response back to the form's handler.
//!
//! # Id allocation
//!
//! Ids come from a FIFO of freed ids first, then from a monotonic counter.
//! Static forms (registered once by long-lived subsystems) always take a
//! fresh counter id, and their ids are never freed: unregistering one burns
//! the id. At any time an id handed out is in exactly one of: open forms,
//! the free list, the static set, or burned.
//!
//! # Locking
//!
//! `forms` is the outer lock. Anything that moves an id between the open
//! forms and the free list does it while holding `forms`, so a response can
//! never race [`FormCache::clear_recyclable_forms`] into freeing an id twice.
//! Response handlers run after every lock is released.

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use blockbridge_form::{CustomForm, Form, FormError};
use blockbridge_protocol::registry::is_the_one_version_with_broken_forms;
use blockbridge_protocol::{ModalFormRequestPacket, ModalFormResponsePacket, NetworkStackLatencyPacket};
use serde_json::Value;

use crate::{EventLoopHandle, Upstream};

/// Timestamp of the image loading probe. Only its sign matters: inbound
/// latency replies with a negative timestamp are recognised as probe echoes.
pub const FORM_IMAGE_HACK_TIMESTAMP: i64 = -1_234_567_890;

/// Minimum delay between a simple form and its image probe.
pub const FORM_IMAGE_HACK_DELAY: Duration = Duration::from_millis(500);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Handlers never run under these locks, so a poisoned guard still holds
    // consistent data.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Open forms for one session.
pub struct FormCache {
    upstream: Arc<dyn Upstream>,
    event_loop: EventLoopHandle,
    image_hack_delay: Duration,
    counter: AtomicI32,
    forms: Mutex<HashMap<i32, Form>>,
    available: Mutex<VecDeque<i32>>,
    non_recyclable: Mutex<HashSet<i32>>,
}

impl FormCache {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        event_loop: EventLoopHandle,
        image_hack_delay: Duration,
    ) -> Self {
        Self {
            upstream,
            event_loop,
            image_hack_delay: image_hack_delay.max(FORM_IMAGE_HACK_DELAY),
            counter: AtomicI32::new(0),
            forms: Mutex::new(HashMap::new()),
            available: Mutex::new(VecDeque::new()),
            non_recyclable: Mutex::new(HashSet::new()),
        }
    }

    pub fn has_form_open(&self) -> bool {
        !lock(&self.forms).is_empty()
    }

    /// Opens `form` and sends it if the client is ready. Forms shown before
    /// that are sent by [`resend_all_forms`](Self::resend_all_forms).
    pub fn show_form(&self, form: Form) -> i32 {
        let form_id = {
            let mut forms = lock(&self.forms);
            let form_id = self.next_form_id();
            forms.insert(form_id, form.clone());
            form_id
        };

        if self.upstream.is_initialized() {
            self.send_form(form_id, &form);
        }
        form_id
    }

    /// Keeps `form` open for the life of the session under a fresh id.
    /// Static forms are not sent; the caller decides when to show them.
    pub fn register_static_form(&self, form: Form) -> i32 {
        let mut forms = lock(&self.forms);
        let form_id = self.counter.fetch_add(1, Ordering::SeqCst);
        lock(&self.non_recyclable).insert(form_id);
        forms.insert(form_id, form);
        form_id
    }

    /// Closes a static form. Its id is not reused.
    pub fn unregister_static_form(&self, form_id: i32) {
        let mut forms = lock(&self.forms);
        lock(&self.non_recyclable).remove(&form_id);
        forms.remove(&form_id);
    }

    /// Closes every non-static form and frees their ids.
    pub fn clear_recyclable_forms(&self) {
        let mut forms = lock(&self.forms);
        let non_recyclable = lock(&self.non_recyclable);
        let mut available = lock(&self.available);

        let mut cleared: Vec<i32> = forms
            .keys()
            .copied()
            .filter(|id| !non_recyclable.contains(id))
            .collect();
        cleared.sort_unstable();
        for form_id in cleared {
            forms.remove(&form_id);
            available.push_back(form_id);
        }
    }

    /// Sends every open form again, e.g. once the client finishes loading.
    pub fn resend_all_forms(&self) {
        let mut open: Vec<(i32, Form)> = lock(&self.forms)
            .iter()
            .map(|(id, form)| (*id, form.clone()))
            .collect();
        open.sort_unstable_by_key(|(id, _)| *id);
        for (form_id, form) in open {
            self.send_form(form_id, &form);
        }
    }

    /// Routes a client response to its form's handler.
    ///
    /// Responses for ids that aren't open (late replies after a clear,
    /// duplicates) are ignored. Handler errors and panics are logged and
    /// never reach the caller.
    pub fn handle_response(&self, response: &ModalFormResponsePacket) {
        let form_id = response.form_id;
        let form = {
            let mut forms = lock(&self.forms);
            let Some(form) = forms.remove(&form_id) else {
                tracing::trace!(form_id, "response for unknown form ignored");
                return;
            };
            if !lock(&self.non_recyclable).contains(&form_id) {
                lock(&self.available).push_back(form_id);
            }
            form
        };

        let mut data = response.form_data.clone();
        if response.cancel_reason.is_none()
            && is_the_one_version_with_broken_forms(&self.upstream.protocol_version())
        {
            if let (Some(custom), Some(raw)) = (form.as_custom(), data.as_deref()) {
                match repair_label_slots(custom, raw) {
                    Ok(repaired) => data = Some(repaired),
                    Err(err) => {
                        tracing::error!(form_id, %err, "error while repairing form response");
                        return;
                    }
                }
            }
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            form.handle_response(data.as_deref(), response.cancel_reason)
        }));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(form_id, %err, "error while processing form response");
            }
            Err(_) => {
                tracing::error!(form_id, "form response handler panicked");
            }
        }
    }

    /// Free ids in the order they'll be reused.
    pub fn available_ids(&self) -> Vec<i32> {
        lock(&self.available).iter().copied().collect()
    }

    /// Ids of open forms, ascending.
    pub fn open_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = lock(&self.forms).keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of registered static forms, ascending.
    pub fn static_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = lock(&self.non_recyclable).iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn next_form_id(&self) -> i32 {
        lock(&self.available)
            .pop_front()
            .unwrap_or_else(|| self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn send_form(&self, form_id: i32, form: &Form) {
        let form_data = match form.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(form_id, %err, "could not encode form");
                return;
            }
        };
        self.upstream
            .send_packet(ModalFormRequestPacket { form_id, form_data }.into());

        // Simple forms don't load url images until the client processes
        // another packet.
        if form.is_simple() {
            let upstream = Arc::clone(&self.upstream);
            self.event_loop.schedule(self.image_hack_delay, move || {
                upstream.send_packet(
                    NetworkStackLatencyPacket {
                        timestamp: FORM_IMAGE_HACK_TIMESTAMP,
                        from_server: true,
                    }
                    .into(),
                );
            });
        }
    }
}

/// Puts back the `null` entries that the 1.21.70 client leaves out for
/// label components.
///
/// A form made only of labels comes back as the literal `null`, which
/// becomes an array with one `null` per label. Responses that already carry
/// a value per component, with `null` at every label, are returned as is.
///
/// # Errors
/// Fails if `data` is neither `null` nor a JSON array.
pub fn repair_label_slots(form: &CustomForm, data: &str) -> Result<String, FormError> {
    let labels = form.label_indices();
    if labels.is_empty() {
        return Ok(data.to_owned());
    }
    if data.starts_with("null") {
        return Ok(serde_json::to_string(&vec![Value::Null; labels.len()])?);
    }

    let received: Vec<Value> = serde_json::from_str(data)?;
    let complete = received.len() == form.content.len()
        && labels.iter().all(|&i| received[i].is_null());
    if complete {
        return Ok(data.to_owned());
    }

    let mut received = received.into_iter();
    let total = received.len() + labels.len();
    let mut repaired = Vec::with_capacity(total);
    for i in 0..total {
        if labels.contains(&i) {
            repaired.push(Value::Null);
        } else if let Some(value) = received.next() {
            repaired.push(value);
        }
    }
    Ok(serde_json::to_string(&repaired)?)
}
