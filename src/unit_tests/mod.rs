mod cross_check;
mod scenarios;
