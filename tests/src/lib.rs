//! End to end runs of the scan pipeline with scripted hosts and a canned lookup API.

#[cfg(test)]
mod support;

#[cfg(test)]
mod discovery {
    mod integration;
}
