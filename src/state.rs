// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::NetworkConfig;
use crate::session::SessionController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub network: Arc<NetworkConfig>,
}

impl AppState {
    pub fn new(controller: Arc<SessionController>, network: NetworkConfig) -> Self {
        Self {
            controller,
            network: Arc::new(network),
        }
    }
}
