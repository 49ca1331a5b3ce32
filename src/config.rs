
/*!

The configuration values consumed by the builders.

Configurations are trees of `ConfigurationValue`. The topology, router, and fault objects are `Object`s whose name selects the builder and whose pairs are its parameters.

```ignore
Configuration{
	topology: UnidirectionalTorus{ k:4, n:2, use_noc_latency:true },
	router: Basic,
	faults: Faults{ link_failures:2, fail_seed:17 },
}
```

Reading the text form is the task of the simulator front-end; this crate only works with the parsed tree.

*/

use std::fmt::{self,Display,Formatter};

use crate::error::*;
use crate::{error};

#[derive(Clone,Debug,PartialEq)]
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
	None,
}

impl Display for ConfigurationValue
{
	fn fmt(&self, formatter: &mut Formatter) -> fmt::Result
	{
		match self
		{
			ConfigurationValue::Literal(s) => write!(formatter,"\"{}\"",s),
			ConfigurationValue::Number(x) => write!(formatter,"{}",x),
			ConfigurationValue::Object(name,pairs) =>
			{
				write!(formatter,"{}",name)?;
				if !pairs.is_empty()
				{
					write!(formatter,"{{")?;
					for (index,(key,value)) in pairs.iter().enumerate()
					{
						if index>0 { write!(formatter,", ")?; }
						write!(formatter,"{}: {}",key,value)?;
					}
					write!(formatter,"}}")?;
				}
				Ok(())
			},
			ConfigurationValue::Array(list) =>
			{
				write!(formatter,"[")?;
				for (index,value) in list.iter().enumerate()
				{
					if index>0 { write!(formatter,", ")?; }
					write!(formatter,"{}",value)?;
				}
				write!(formatter,"]")
			},
			ConfigurationValue::True => write!(formatter,"true"),
			ConfigurationValue::False => write!(formatter,"false"),
			ConfigurationValue::None => write!(formatter,"None"),
		}
	}
}

///Iterates over the pairs of a `ConfigurationValue::Object`, running the arm whose key matches.
///It checks the name of the object and returns an error on unknown keys or non-objects.
///The key `legend_name` is always accepted and ignored.
///```ignore
///match_object!(cv,"UnidirectionalTorus",value,
///	"k" => k=Some(value.as_usize()?),
///);
///```
#[macro_export]
macro_rules! match_object{
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		$crate::match_object!($cv,[$name],$valueid,$($arm)*)
	}};
	($cv:expr, $names:expr, $valueid:ident, $($arm:tt)* ) => {{
		if let &$crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if !$names.iter().any(|&x|x==cv_name)
			{
				return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Expected an object of {:?}, not `{}`",$names,cv_name)));
			}
			for &(ref name,ref $valueid) in cv_pairs
			{
				match AsRef::<str>::as_ref(&name)
				{
					$( $arm )*
					"legend_name" => (),
					_ => return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Nothing to do with field {} in {}",name,$names.get(0).unwrap_or_else(||&"None")))),
				}
			}
		}
		else
		{
			return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Trying to create a {} from a non-Object",$names.get(0).unwrap_or_else(||&"None"))));
		}
	}};
}

impl ConfigurationValue
{
	pub fn as_bool(&self) -> Result<bool,Error>
	{
		match self
		{
			&ConfigurationValue::True => Ok(true),
			&ConfigurationValue::False => Ok(false),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	///Read a non-negative integer. Numbers with a fractional part or negative are rejected.
	pub fn as_usize(&self) -> Result<usize,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) =>{
				// Casting from a float to an integer will round the float towards zero
				// overflows and underflows will saturate
				let res = x as usize;
				let y = res as f64;
				let tolerance = 1e-5;
				if x-y > tolerance || x-y < -tolerance {
					Err(error!(ill_formed_configuration, self.clone()))
				} else {
					Ok( res )
				}
			},
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	/// Build a generic IllFormedConfiguration error from this ConfigurationValue.
	pub fn ill(&self,message:&str) -> Error
	{
		error!(ill_formed_configuration,self.clone()).with_message(message.to_string())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn parse_pair(cv:&ConfigurationValue) -> Result<(usize,bool),Error>
	{
		let mut size=None;
		let mut flag=false;
		match_object!(cv,"Pair",value,
			"size" => size=Some(value.as_usize()?),
			"flag" => flag=value.as_bool()?,
		);
		let size=size.ok_or_else(||cv.ill("There were no size"))?;
		Ok((size,flag))
	}

	#[test]
	fn accessors()
	{
		assert_eq!(ConfigurationValue::Number(4.0).as_usize().unwrap(),4);
		assert!(ConfigurationValue::Number(4.5).as_usize().is_err());
		assert!(ConfigurationValue::True.as_bool().unwrap());
		assert!(ConfigurationValue::Number(1.0).as_bool().is_err());
	}

	#[test]
	fn match_object_reads_known_keys()
	{
		let cv=ConfigurationValue::Object("Pair".to_string(),vec![
			("size".to_string(),ConfigurationValue::Number(3.0)),
			("flag".to_string(),ConfigurationValue::True),
			("legend_name".to_string(),ConfigurationValue::Literal("ignored".to_string())),
		]);
		assert_eq!(parse_pair(&cv).unwrap(),(3,true));
	}

	#[test]
	fn match_object_rejects_unknown()
	{
		let unknown_key=ConfigurationValue::Object("Pair".to_string(),vec![
			("size".to_string(),ConfigurationValue::Number(3.0)),
			("colour".to_string(),ConfigurationValue::True),
		]);
		assert!(parse_pair(&unknown_key).is_err());
		let wrong_name=ConfigurationValue::Object("Triple".to_string(),vec![]);
		assert!(parse_pair(&wrong_name).is_err());
		assert!(parse_pair(&ConfigurationValue::Number(2.0)).is_err());
	}

	#[test]
	fn display()
	{
		let cv=ConfigurationValue::Object("Faults".to_string(),vec![
			("link_failures".to_string(),ConfigurationValue::Number(2.0)),
			("list".to_string(),ConfigurationValue::Array(vec![ConfigurationValue::True,ConfigurationValue::False])),
		]);
		assert_eq!(format!("{}",cv),"Faults{link_failures: 2, list: [true, false]}");
	}
}
