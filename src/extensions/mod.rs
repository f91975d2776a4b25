pub mod kube_error;
