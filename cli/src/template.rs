pub mod budget;
pub mod site;
