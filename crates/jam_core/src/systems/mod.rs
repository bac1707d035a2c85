pub mod boarding;
pub mod click;
pub mod countdown;
pub mod departure;
pub mod dispatch;
pub mod path_step;
pub mod waiting_arrival;
