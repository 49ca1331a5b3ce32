
use std::cell::RefCell;
use std::rc::Rc;
use std::mem::size_of;

use super::{Router,RouterBuilderArgument};
use crate::channel::{ChannelPair,Endpoint};
use crate::error::Error;
use crate::quantify::Quantifiable;
use crate::{error,match_object};

///A router keeping only the table of channels bound to its ports.
#[derive(Debug)]
pub struct Basic
{
	router_index: usize,
	name: String,
	input_ports: usize,
	output_ports: usize,
	inputs: Vec<ChannelPair>,
	outputs: Vec<ChannelPair>,
}

impl Basic
{
	pub fn new(arg:RouterBuilderArgument) -> Result<Rc<RefCell<Basic>>,Error>
	{
		let RouterBuilderArgument{
			cv,
			name,
			router_index,
			input_ports,
			output_ports,
			..
		} = arg;
		match_object!(cv,"Basic",_value,);
		Ok(Rc::new(RefCell::new(Basic{
			router_index,
			name,
			input_ports,
			output_ports,
			inputs: Vec::with_capacity(input_ports),
			outputs: Vec::with_capacity(output_ports),
		})))
	}
}

impl Router for Basic
{
	fn router_index(&self) -> usize
	{
		self.router_index
	}
	fn name(&self) -> &str
	{
		&self.name
	}
	fn num_input_ports(&self) -> usize
	{
		self.input_ports
	}
	fn num_output_ports(&self) -> usize
	{
		self.output_ports
	}
	fn add_input_channel(&mut self, channel:ChannelPair) -> Result<usize,Error>
	{
		let port = self.inputs.len();
		if port >= self.input_ports
		{
			return Err(error!(binding_mismatch,format!("{} {}",channel.kind(),channel.index()))
				.with_message(format!("{} has all its {} input ports bound",self.name,self.input_ports)));
		}
		channel.bind_as_input(Endpoint{router_index:self.router_index,port})?;
		self.inputs.push(channel);
		Ok(port)
	}
	fn add_output_channel(&mut self, channel:ChannelPair) -> Result<usize,Error>
	{
		let port = self.outputs.len();
		if port >= self.output_ports
		{
			return Err(error!(binding_mismatch,format!("{} {}",channel.kind(),channel.index()))
				.with_message(format!("{} has all its {} output ports bound",self.name,self.output_ports)));
		}
		channel.bind_as_output(Endpoint{router_index:self.router_index,port})?;
		self.outputs.push(channel);
		Ok(port)
	}
	fn input_channel(&self, port:usize) -> Option<&ChannelPair>
	{
		self.inputs.get(port)
	}
	fn output_channel(&self, port:usize) -> Option<&ChannelPair>
	{
		self.outputs.get(port)
	}
}

impl Quantifiable for Basic
{
	fn total_memory(&self) -> usize
	{
		//The channels are owned by the network, only the handles are counted here.
		size_of::<Basic>() + self.name.capacity() + (self.inputs.capacity()+self.outputs.capacity())*size_of::<ChannelPair>()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Basic>() + (self.input_ports+self.output_ports)*size_of::<ChannelPair>()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::Plugs;
	use crate::channel::ChannelKind;
	use crate::config::ConfigurationValue;
	use crate::error::ErrorKind;

	fn basic(plugs:&Plugs, cv:&ConfigurationValue) -> Result<Rc<RefCell<Basic>>,Error>
	{
		Basic::new(RouterBuilderArgument{
			cv,
			plugs,
			name: "router_0_1".to_string(),
			router_index: 1,
			input_ports: 2,
			output_ports: 1,
		})
	}

	#[test]
	fn ports_are_assigned_in_order()
	{
		let plugs = Plugs::default();
		let cv = ConfigurationValue::Object("Basic".to_string(),vec![]);
		let router = basic(&plugs,&cv).unwrap();
		let mut router = router.borrow_mut();
		let first = ChannelPair::new(ChannelKind::Torus,0);
		let second = ChannelPair::new(ChannelKind::Injection,1);
		assert_eq!(router.add_input_channel(first.clone()).unwrap(),0);
		assert_eq!(router.add_input_channel(second).unwrap(),1);
		assert_eq!(first.sink(),Some(Endpoint{router_index:1,port:0}));
		assert_eq!(router.input_channel(0).map(|pair|pair.index()),Some(0));
		assert!(router.input_channel(2).is_none());
		assert_eq!(router.name(),"router_0_1");
	}

	#[test]
	fn extra_ports_are_rejected()
	{
		let plugs = Plugs::default();
		let cv = ConfigurationValue::Object("Basic".to_string(),vec![]);
		let router = basic(&plugs,&cv).unwrap();
		let mut router = router.borrow_mut();
		router.add_output_channel(ChannelPair::new(ChannelKind::Torus,0)).unwrap();
		let error = router.add_output_channel(ChannelPair::new(ChannelKind::Ejection,1)).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::BindingMismatch{..}));
	}

	#[test]
	fn unknown_fields_are_rejected()
	{
		let plugs = Plugs::default();
		let cv = ConfigurationValue::Object("Basic".to_string(),vec![("buffer_size".to_string(),ConfigurationValue::Number(4.0))]);
		assert!(basic(&plugs,&cv).is_err());
	}
}
