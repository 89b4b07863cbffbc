mod load_workflow;
mod scenarios;
