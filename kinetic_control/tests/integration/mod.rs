mod builder;
mod config_loading;
mod control_accuracy;
