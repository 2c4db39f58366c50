/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Bugwire, a Bugzilla client library.
 *
 * Bugwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Bugwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Bugwire.  If not, see <http://www.gnu.org/licenses/>.
 */


//! Blocking Bugzilla connector. Each call drives the async [`BugzillaConnector`] to completion
//! on a private current-thread tokio runtime, so it must not be called from inside another
//! runtime.

use std::io;

use tokio::runtime::{Builder, Runtime};

use bugwire_core::{
    BugzillaConnector, BugzillaError, BugzillaHttpParser, BugzillaMethod, ConnectorConfig,
};

pub use bugwire_core;

pub struct BlockingConnector {
    runtime: Runtime,
    inner: BugzillaConnector,
}

impl BlockingConnector {
    pub fn new() -> io::Result<Self> {
        Self::wrap(BugzillaConnector::new())
    }

    /// Unconnected connector using the config's timeout and user agent.
    pub fn with_config(config: &ConnectorConfig) -> io::Result<Self> {
        Self::wrap(BugzillaConnector::with_config(config))
    }

    fn wrap(inner: BugzillaConnector) -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        tracing::trace!("blocking connector runtime started");
        Ok(Self { runtime, inner })
    }

    /// See [`BugzillaConnector::connect`].
    pub fn connect(
        &mut self,
        host: &str,
        http_user: Option<&str>,
        http_password: Option<&str>,
    ) -> Result<(), BugzillaError> {
        self.inner.connect(host, http_user, http_password)
    }

    pub fn connect_with(&mut self, config: &ConnectorConfig) -> Result<(), BugzillaError> {
        self.inner.connect_with(config)
    }

    pub fn execute_method<M: BugzillaMethod + ?Sized>(
        &mut self,
        method: &mut M,
    ) -> Result<(), BugzillaError> {
        self.runtime.block_on(self.inner.execute_method(method))
    }

    pub fn execute_http_request<P: BugzillaHttpParser + ?Sized>(
        &mut self,
        parser: &mut P,
    ) -> Result<(), BugzillaError> {
        self.runtime.block_on(self.inner.execute_http_request(parser))
    }

    pub fn user(&self) -> Option<&str> {
        self.inner.user()
    }

    pub fn host(&self) -> Option<&str> {
        self.inner.host()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// The wrapped async connector, e.g. to hand over a logged-in session.
    pub fn into_inner(self) -> BugzillaConnector {
        self.inner
    }
}
