//! Drivers command - list registered backend drivers.

use blockport_backend::BackendRegistry;

pub fn run() {
    let registry = BackendRegistry::with_defaults();
    for driver in registry.drivers() {
        println!("{driver}");
    }
}
