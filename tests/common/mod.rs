#![allow(dead_code)]
use caminos_unitorus::*;
use caminos_unitorus::config::ConfigurationValue;
use caminos_unitorus::error::Error;
use caminos_unitorus::network::Network;


pub fn create_torus(k: f64, n: f64, use_noc_latency: ConfigurationValue) -> ConfigurationValue
{
    ConfigurationValue::Object("UnidirectionalTorus".to_string(), vec![
        ("k".to_string(), ConfigurationValue::Number(k)),
        ("n".to_string(), ConfigurationValue::Number(n)),
        ("use_noc_latency".to_string(), use_noc_latency),
    ])
}

pub fn create_faults(link_failures: f64, fail_seed: f64) -> ConfigurationValue
{
    ConfigurationValue::Object("Faults".to_string(), vec![
        ("link_failures".to_string(), ConfigurationValue::Number(link_failures)),
        ("fail_seed".to_string(), ConfigurationValue::Number(fail_seed)),
    ])
}

pub fn create_basic_router() -> ConfigurationValue
{
    ConfigurationValue::Object("Basic".to_string(), vec![])
}

pub fn create_configuration(topology: ConfigurationValue, router: Option<ConfigurationValue>, faults: Option<ConfigurationValue>) -> ConfigurationValue
{
    let mut pairs = vec![("topology".to_string(), topology)];
    if let Some(router) = router
    {
        pairs.push(("router".to_string(), router));
    }
    if let Some(faults) = faults
    {
        pairs.push(("faults".to_string(), faults));
    }
    ConfigurationValue::Object("Configuration".to_string(), pairs)
}

/// Plugs with the routings of this crate registered.
pub fn create_plugs() -> Plugs
{
    let mut plugs = Plugs::default();
    register_routing_functions(&mut plugs);
    plugs
}

pub fn build_torus(k: usize, n: usize, use_noc_latency: bool) -> Result<Network, Error>
{
    let noc = if use_noc_latency { ConfigurationValue::True } else { ConfigurationValue::False };
    let cv = create_configuration(create_torus(k as f64, n as f64, noc), Some(create_basic_router()), None);
    Network::new(&cv, &create_plugs())
}
