
/*!

A Router is the component at each node that owns the ports of the node. This crate only covers how routers are created and bound to their channels; switching, arbitration, and flow control belong to the router implementations plugged into the simulator.

see [`new_router`](fn.new_router.html) for the configuration syntax of predefined routers.

*/

pub mod basic;

use std::cell::RefCell;
use std::rc::Rc;
use std::fmt::Debug;

use crate::channel::ChannelPair;
use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::quantify::Quantifiable;
use crate::{error,Plugs};

pub use self::basic::Basic;

///The interface the network builder uses on the routers.
///Ports are numbered in binding order, separately for inputs and outputs.
pub trait Router : Quantifiable + Debug
{
	///Its index in the topology.
	fn router_index(&self) -> usize;
	///The name given at construction, encoding its coordinates.
	fn name(&self) -> &str;
	///Amount of input ports the router was provisioned with.
	fn num_input_ports(&self) -> usize;
	///Amount of output ports the router was provisioned with.
	fn num_output_ports(&self) -> usize;
	///Bind the pair to the next free input port. Returns the port index.
	fn add_input_channel(&mut self, channel:ChannelPair) -> Result<usize,Error>;
	///Bind the pair to the next free output port. Returns the port index.
	fn add_output_channel(&mut self, channel:ChannelPair) -> Result<usize,Error>;
	///The channel bound to an input port, if any.
	fn input_channel(&self, port:usize) -> Option<&ChannelPair>;
	///The channel bound to an output port, if any.
	fn output_channel(&self, port:usize) -> Option<&ChannelPair>;
}

///The argument of a builder function for `Router`s.
#[derive(Debug)]
pub struct RouterBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the router.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the router needs to create elements.
	pub plugs: &'a Plugs,
	///The name of the router, as given by the topology.
	pub name: String,
	///The index of the router in the topology.
	pub router_index: usize,
	pub input_ports: usize,
	pub output_ports: usize,
}

/**Build a new router.

## Basic

It only keeps the table of bound channels.

```ignore
Basic{
	legend_name: "port table",
}
```

Any other name must be registered in the plugs with `Plugs::add_router`.
**/
pub fn new_router(arg:RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.router(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"Basic" =>
			{
				let router:Rc<RefCell<dyn Router>> = Basic::new(arg)?;
				Ok(router)
			},
			_ => Err(error!(unknown_name,"router",cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create a Router from a non-Object".to_string()))
	}
}
