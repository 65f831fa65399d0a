pub mod allocation_record;
pub mod construction_record;
pub mod mapper;

pub use allocation_record::AllocationRecord;
pub use construction_record::ConstructionRecord;
