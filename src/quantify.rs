
/*!

Memory accounting of the built network. Structures implement `Quantifiable`, usually through `#[derive(Quantifiable)]` from `quantifiable-derive`.

*/

use std::mem::size_of;
use std::rc::Rc;
use std::cell::RefCell;

pub trait Quantifiable
{
	///Get an estimation of how much memory is using the object.
	fn total_memory(&self) -> usize;
	///Print the memory used by each of the parts of the object.
	fn print_memory_breakdown(&self);
	///Get an estimation of how much memory the object will use, without building it.
	fn forecast_total_memory(&self) -> usize;
}

macro_rules! quantifiable_simple{
	($($t:ty),*) => {
		$(
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
			fn print_memory_breakdown(&self)
			{
				unimplemented!();
			}
			fn forecast_total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
		}
		)*
	}
}

quantifiable_simple!(bool,u8,u32,u64,usize,i32,f32,f64);

impl Quantifiable for String
{
	fn total_memory(&self) -> usize
	{
		size_of::<String>() + self.capacity()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		let mut total = size_of::<Vec<T>>() + (self.capacity()-self.len())*size_of::<T>();
		for element in self.iter()
		{
			total += element.total_memory();
		}
		total
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Vec<T>>() + (self.capacity()-self.len())*size_of::<T>() + self.iter().map(|element|element.forecast_total_memory()).sum::<usize>()
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		match self
		{
			Some(value) => size_of::<Option<T>>() - size_of::<T>() + value.total_memory(),
			None => size_of::<Option<T>>(),
		}
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		match self
		{
			Some(value) => size_of::<Option<T>>() - size_of::<T>() + value.forecast_total_memory(),
			None => size_of::<Option<T>>(),
		}
	}
}

///Counts the pointer and the pointee. Shared pointees are counted once per handle, so owners should prefer to count the pointee themselves.
impl<T:Quantifiable+?Sized> Quantifiable for Rc<RefCell<T>>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Rc<RefCell<T>>>() + self.borrow().total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Rc<RefCell<T>>>() + self.borrow().forecast_total_memory()
	}
}
